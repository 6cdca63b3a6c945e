use serde::{Deserialize, Serialize};

use hackathon_core::{ParticipantId, UserId};

use crate::Role;

/// Participant profile linked to a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantProfile {
    pub id: ParticipantId,
    pub name: String,
}

/// A user resolved from a persisted record for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub participant: Option<ParticipantProfile>,
}

impl Identity {
    /// The participant id, when this identity acts as a participant.
    pub fn participant_id(&self) -> Option<ParticipantId> {
        match self.role {
            Role::Participant => self.participant.as_ref().map(|p| p.id),
            _ => None,
        }
    }
}
