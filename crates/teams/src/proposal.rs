//! Invitations (owner → participant) and join requests (participant → owner).
//!
//! Both are pending proposals; accepting one adds a roster row.

use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use hackathon_auth::Identity;
use hackathon_core::{DomainError, DomainResult, InvitationId, JoinRequestId, ParticipantId, TeamId};
use hackathon_events::Event;

use crate::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ProposalStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProposalStatus::Pending),
            "accepted" => Ok(ProposalStatus::Accepted),
            "rejected" => Ok(ProposalStatus::Rejected),
            other => Err(DomainError::invalid_status(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalDecision {
    Accept,
    Reject,
}

impl ProposalDecision {
    fn outcome(self) -> ProposalStatus {
        match self {
            ProposalDecision::Accept => ProposalStatus::Accepted,
            ProposalDecision::Reject => ProposalStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInvitation {
    pub id: InvitationId,
    pub team_id: TeamId,
    pub participant_id: ParticipantId,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRequest {
    pub id: JoinRequestId,
    pub team_id: TeamId,
    pub participant_id: ParticipantId,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
}

/// A validated pending proposal, ready to insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewProposal {
    pub team_id: TeamId,
    pub participant_id: ParticipantId,
}

fn ensure_open(event: &Event) -> DomainResult<()> {
    if event.accepts_teams() {
        Ok(())
    } else {
        Err(DomainError::invalid_status(format!(
            "event is {} and team rosters are closed",
            event.status
        )))
    }
}

fn ensure_free(participant_team: Option<TeamId>) -> DomainResult<()> {
    match participant_team {
        None => Ok(()),
        Some(_) => Err(DomainError::conflict(
            "participant already belongs to a team for this event",
        )),
    }
}

fn ensure_pending(status: ProposalStatus) -> DomainResult<()> {
    if status == ProposalStatus::Pending {
        Ok(())
    } else {
        Err(DomainError::invalid_status(format!(
            "proposal is already {}",
            status.as_str()
        )))
    }
}

/// Owner invites a participant.
///
/// `invitee_team` is the invitee's current team in the event, if any.
pub fn decide_invite(
    actor: &Identity,
    team: &Team,
    event: &Event,
    invitee: ParticipantId,
    invitee_team: Option<TeamId>,
    pending_exists: bool,
) -> DomainResult<NewProposal> {
    let owner = team.ensure_owner(actor)?;
    ensure_open(event)?;
    if invitee == owner {
        return Err(DomainError::validation("cannot invite yourself"));
    }
    ensure_free(invitee_team)?;
    if pending_exists {
        return Err(DomainError::conflict("an invitation is already pending"));
    }
    Ok(NewProposal {
        team_id: team.id,
        participant_id: invitee,
    })
}

/// Invitee accepts or rejects. Returns the status to persist.
pub fn decide_respond_invitation(
    actor: &Identity,
    invitation: &TeamInvitation,
    event: &Event,
    decision: ProposalDecision,
    invitee_team: Option<TeamId>,
) -> DomainResult<ProposalStatus> {
    if actor.participant_id() != Some(invitation.participant_id) {
        return Err(DomainError::Forbidden);
    }
    ensure_pending(invitation.status)?;
    if decision == ProposalDecision::Accept {
        ensure_open(event)?;
        ensure_free(invitee_team)?;
    }
    Ok(decision.outcome())
}

/// Participant asks to join a team.
pub fn decide_request_join(
    actor: &Identity,
    team: &Team,
    event: &Event,
    actor_team: Option<TeamId>,
    pending_exists: bool,
) -> DomainResult<NewProposal> {
    let requester = actor.participant_id().ok_or(DomainError::Forbidden)?;
    ensure_open(event)?;
    if team.is_owned_by(requester) {
        return Err(DomainError::validation("owners are already on their team"));
    }
    ensure_free(actor_team)?;
    if pending_exists {
        return Err(DomainError::conflict("a join request is already pending"));
    }
    Ok(NewProposal {
        team_id: team.id,
        participant_id: requester,
    })
}

/// Team owner approves or rejects a join request.
pub fn decide_respond_request(
    actor: &Identity,
    team: &Team,
    request: &TeamRequest,
    event: &Event,
    decision: ProposalDecision,
    requester_team: Option<TeamId>,
) -> DomainResult<ProposalStatus> {
    team.ensure_owner(actor)?;
    if request.team_id != team.id {
        return Err(DomainError::not_found("team request"));
    }
    ensure_pending(request.status)?;
    if decision == ProposalDecision::Accept {
        ensure_open(event)?;
        ensure_free(requester_team)?;
    }
    Ok(decision.outcome())
}
