//! Judges and mentors registered for an event.

use serde::{Deserialize, Serialize};

use hackathon_core::{EventId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffKind {
    Judge,
    Mentor,
}

impl StaffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffKind::Judge => "judge",
            StaffKind::Mentor => "mentor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffAssignment {
    pub event_id: EventId,
    pub user_id: UserId,
    pub kind: StaffKind,
}
