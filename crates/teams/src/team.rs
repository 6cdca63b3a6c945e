use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hackathon_auth::Identity;
use hackathon_core::{DomainError, DomainResult, EventId, ParticipantId, TeamId};
use hackathon_events::Event;

/// A team competing in one event, owned by the participant who created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub event_id: EventId,
    pub owner_id: ParticipantId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub fn is_owned_by(&self, participant: ParticipantId) -> bool {
        self.owner_id == participant
    }

    /// Owner check for an authenticated identity. Non-participants never own teams.
    pub fn ensure_owner(&self, actor: &Identity) -> DomainResult<ParticipantId> {
        match actor.participant_id() {
            Some(pid) if self.is_owned_by(pid) => Ok(pid),
            _ => Err(DomainError::Forbidden),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub team_id: TeamId,
    pub participant_id: ParticipantId,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTeam {
    pub event_id: EventId,
    pub name: String,
}

/// A validated team, ready to be inserted together with its owner's membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
    pub event_id: EventId,
    pub owner_id: ParticipantId,
    pub name: String,
}

/// Decide team creation.
///
/// `actor_team` is the team the actor already belongs to in this event, if any.
pub fn decide_create_team(
    actor: &Identity,
    event: &Event,
    actor_team: Option<TeamId>,
    request: &CreateTeam,
) -> DomainResult<NewTeam> {
    let owner_id = actor.participant_id().ok_or(DomainError::Forbidden)?;

    if request.event_id != event.id {
        return Err(DomainError::validation("event_id does not match the event"));
    }
    if !event.accepts_teams() {
        return Err(DomainError::invalid_status(format!(
            "event is {} and not open for team registration",
            event.status
        )));
    }
    if actor_team.is_some() {
        return Err(DomainError::conflict(
            "participant already belongs to a team for this event",
        ));
    }

    let name = request.name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("team name cannot be empty"));
    }

    Ok(NewTeam {
        event_id: event.id,
        owner_id,
        name: name.to_string(),
    })
}
