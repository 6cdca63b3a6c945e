use hackathon_auth::Role;
use hackathon_core::{DomainError, DomainResult, EventId, Page, Pagination, UserId};
use hackathon_events::{CreateEvent, Event, EventStatusTransition, StaffAssignment, StaffKind};
use hackathon_infra::Stores;

use super::found;

pub struct EventService {
    stores: Stores,
}

impl EventService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn list(&self, pagination: Pagination) -> DomainResult<Page<Event>> {
        let (items, total) = self.stores.events.list_events(&pagination).await?;
        Ok(Page::new(items, total, &pagination))
    }

    pub async fn get(&self, id: EventId) -> DomainResult<Event> {
        found(self.stores.events.find_event(id).await?, "event")
    }

    pub async fn latest(&self) -> DomainResult<Event> {
        found(self.stores.events.latest_event().await?, "event")
    }

    pub async fn create(&self, request: CreateEvent) -> DomainResult<Event> {
        request.validate()?;
        let event = self.stores.events.create_event(&request).await?;
        tracing::info!(event_id = %event.id, "event created");
        Ok(event)
    }

    pub async fn transition(&self, id: EventId, request: EventStatusTransition) -> DomainResult<Event> {
        let event = self.get(id).await?;
        let next = event.transition(request.status)?;
        let event = self.stores.events.set_event_status(id, next).await?;
        tracing::info!(event_id = %id, status = %next, "event status changed");
        Ok(event)
    }

    /// Register a judge or mentor. The user must hold the matching role.
    pub async fn assign_staff(&self, event_id: EventId, user_id: UserId, kind: StaffKind) -> DomainResult<StaffAssignment> {
        self.get(event_id).await?;
        let user = found(self.stores.users.find_user(user_id).await?, "user")?;
        let expected = match kind {
            StaffKind::Judge => Role::Judge,
            StaffKind::Mentor => Role::Mentor,
        };
        if user.role != expected {
            return Err(DomainError::validation(format!(
                "user {user_id} is not a {}",
                kind.as_str()
            )));
        }

        let assignment = StaffAssignment {
            event_id,
            user_id,
            kind,
        };
        self.stores.events.add_staff(assignment).await?;
        tracing::info!(event_id = %event_id, user_id = %user_id, kind = kind.as_str(), "staff assigned");
        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::fixtures::Fixture;
    use hackathon_events::EventStatus;

    #[tokio::test]
    async fn illegal_transition_is_rejected_and_nothing_changes() {
        let fx = Fixture::new();
        let service = EventService::new(fx.stores.clone());
        let event = fx.event(EventStatus::Created).await;

        let err = service
            .transition(event.id, EventStatusTransition { status: EventStatus::Running })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStatus(_)));
        assert_eq!(service.get(event.id).await.unwrap().status, EventStatus::Created);

        let approved = service
            .transition(event.id, EventStatusTransition { status: EventStatus::Approved })
            .await
            .unwrap();
        assert_eq!(approved.status, EventStatus::Approved);
    }

    #[tokio::test]
    async fn staff_must_hold_the_matching_role() {
        let fx = Fixture::new();
        let service = EventService::new(fx.stores.clone());
        let event = fx.event(EventStatus::Running).await;
        let judge = fx.user("judge@example.com", Role::Judge);
        let mentor = fx.user("mentor@example.com", Role::Mentor);

        let err = service
            .assign_staff(event.id, mentor.id, StaffKind::Judge)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        service.assign_staff(event.id, judge.id, StaffKind::Judge).await.unwrap();
        assert!(fx.stores.events.is_staff(event.id, judge.id, StaffKind::Judge).await.unwrap());

        let again = service
            .assign_staff(event.id, judge.id, StaffKind::Judge)
            .await
            .unwrap_err();
        assert!(matches!(again, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn latest_event_missing_is_not_found() {
        let fx = Fixture::new();
        let service = EventService::new(fx.stores.clone());
        assert_eq!(service.latest().await, Err(DomainError::not_found("event")));
    }
}
