use core::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use hackathon_core::{DomainError, DomainResult, EventId, RegionId};

/// Event status lifecycle.
///
/// `created → approved | rejected`, `approved → running`, `running → finished`,
/// and any non-inactive status may be deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Created,
    Approved,
    Rejected,
    Running,
    Finished,
    Inactive,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Created => "created",
            EventStatus::Approved => "approved",
            EventStatus::Rejected => "rejected",
            EventStatus::Running => "running",
            EventStatus::Finished => "finished",
            EventStatus::Inactive => "inactive",
        }
    }

    pub fn can_transition_to(self, next: EventStatus) -> bool {
        use EventStatus::*;
        match (self, next) {
            (Inactive, _) => false,
            (_, Inactive) => true,
            (Created, Approved) | (Created, Rejected) => true,
            (Approved, Running) => true,
            (Running, Finished) => true,
            _ => false,
        }
    }
}

impl core::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(EventStatus::Created),
            "approved" => Ok(EventStatus::Approved),
            "rejected" => Ok(EventStatus::Rejected),
            "running" => Ok(EventStatus::Running),
            "finished" => Ok(EventStatus::Finished),
            "inactive" => Ok(EventStatus::Inactive),
            other => Err(DomainError::invalid_status(other.to_string())),
        }
    }
}

/// A hackathon event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub description: Option<String>,
    pub region_id: Option<RegionId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn is_running(&self) -> bool {
        self.status == EventStatus::Running
    }

    pub fn ensure_running(&self) -> DomainResult<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(DomainError::EventNotRunning)
        }
    }

    /// Teams may be formed once the event is approved and until it finishes.
    pub fn accepts_teams(&self) -> bool {
        matches!(self.status, EventStatus::Approved | EventStatus::Running)
    }

    /// Decide the status change; returns the status to persist.
    pub fn transition(&self, next: EventStatus) -> DomainResult<EventStatus> {
        if self.status.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::invalid_status(format!(
                "cannot move event from {} to {}",
                self.status, next
            )))
        }
    }
}

/// Request to create an event. New events always start in `created`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEvent {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub region_id: Option<RegionId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CreateEvent {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("event name cannot be empty"));
        }
        if self.end_date < self.start_date {
            return Err(DomainError::validation("end_date must not precede start_date"));
        }
        Ok(())
    }
}

/// Admin request to move an event to another status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStatusTransition {
    pub status: EventStatus,
}

/// The event shown on the public landing page: the newest one that is still live or upcoming.
pub fn latest(events: &[Event]) -> Option<&Event> {
    events
        .iter()
        .filter(|e| !matches!(e.status, EventStatus::Inactive | EventStatus::Rejected))
        .max_by_key(|e| (e.start_date, e.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: i64, status: EventStatus, start: (i32, u32, u32)) -> Event {
        let start_date = NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap();
        Event {
            id: EventId::new(id),
            name: format!("Hack {id}"),
            description: None,
            region_id: None,
            start_date,
            end_date: start_date,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn only_running_events_pass_the_gate() {
        assert!(event(1, EventStatus::Running, (2026, 1, 1)).ensure_running().is_ok());
        for status in [
            EventStatus::Created,
            EventStatus::Approved,
            EventStatus::Rejected,
            EventStatus::Finished,
            EventStatus::Inactive,
        ] {
            assert_eq!(
                event(1, status, (2026, 1, 1)).ensure_running(),
                Err(DomainError::EventNotRunning)
            );
        }
    }

    #[test]
    fn full_lifecycle_created_to_finished() {
        let mut e = event(1, EventStatus::Created, (2026, 1, 1));
        for next in [EventStatus::Approved, EventStatus::Running, EventStatus::Finished] {
            e.status = e.transition(next).unwrap();
        }
        assert_eq!(e.status, EventStatus::Finished);
    }

    #[test]
    fn cannot_skip_approval_or_reopen() {
        let created = event(1, EventStatus::Created, (2026, 1, 1));
        assert!(matches!(
            created.transition(EventStatus::Running),
            Err(DomainError::InvalidStatus(_))
        ));
        let finished = event(1, EventStatus::Finished, (2026, 1, 1));
        assert!(finished.transition(EventStatus::Running).is_err());
        let inactive = event(1, EventStatus::Inactive, (2026, 1, 1));
        assert!(inactive.transition(EventStatus::Inactive).is_err());
    }

    #[test]
    fn any_live_status_can_be_deactivated() {
        for status in [EventStatus::Created, EventStatus::Running, EventStatus::Finished] {
            assert!(event(1, status, (2026, 1, 1)).transition(EventStatus::Inactive).is_ok());
        }
    }

    #[test]
    fn latest_skips_inactive_and_rejected() {
        let events = vec![
            event(1, EventStatus::Finished, (2025, 6, 1)),
            event(2, EventStatus::Running, (2026, 3, 1)),
            event(3, EventStatus::Inactive, (2026, 9, 1)),
            event(4, EventStatus::Rejected, (2027, 1, 1)),
        ];
        assert_eq!(latest(&events).map(|e| e.id), Some(EventId::new(2)));
        assert!(latest(&[]).is_none());
    }

    #[test]
    fn create_event_requires_name_and_ordered_dates() {
        let mut req = CreateEvent {
            name: "  ".to_string(),
            description: None,
            region_id: None,
            start_date: NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        };
        assert!(req.validate().is_err());
        req.name = "Hack".to_string();
        assert!(req.validate().is_err());
        req.end_date = req.start_date;
        assert!(req.validate().is_ok());
    }
}
