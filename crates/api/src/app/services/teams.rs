use hackathon_auth::Identity;
use hackathon_core::{
    DomainError, DomainResult, EventId, InvitationId, JoinRequestId, Page, Pagination,
    ParticipantId, TeamId,
};
use hackathon_events::Event;
use hackathon_infra::Stores;
use hackathon_teams::{
    CreateTeam, ProposalDecision, ProposalStatus, Team, TeamInvitation, TeamMember, TeamRequest,
    decide_create_team, decide_invite, decide_request_join, decide_respond_invitation,
    decide_respond_request,
};

use super::found;

pub struct TeamService {
    stores: Stores,
}

impl TeamService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn list(&self, event_id: Option<EventId>, pagination: Pagination) -> DomainResult<Page<Team>> {
        let (items, total) = self.stores.teams.list_teams(event_id, &pagination).await?;
        Ok(Page::new(items, total, &pagination))
    }

    pub async fn get(&self, id: TeamId) -> DomainResult<(Team, Vec<TeamMember>)> {
        let team = self.team(id).await?;
        let members = self.stores.teams.team_members(id).await?;
        Ok((team, members))
    }

    pub async fn create(&self, actor: &Identity, request: CreateTeam) -> DomainResult<Team> {
        let event = self.event(request.event_id).await?;
        let actor_team = self.membership_of(event.id, actor.participant_id()).await?;
        let new_team = decide_create_team(actor, &event, actor_team, &request)?;
        let team = self.stores.teams.create_team_with_owner(new_team).await?;
        tracing::info!(team_id = %team.id, event_id = %event.id, "team created");
        Ok(team)
    }

    pub async fn invite(
        &self,
        actor: &Identity,
        team_id: TeamId,
        invitee: ParticipantId,
    ) -> DomainResult<TeamInvitation> {
        let team = self.team(team_id).await?;
        team.ensure_owner(actor)?;
        let event = self.event(team.event_id).await?;
        found(self.stores.users.find_participant(invitee).await?, "participant")?;

        let invitee_team = self.stores.teams.membership(event.id, invitee).await?;
        let pending = self.stores.teams.pending_invitation_exists(team.id, invitee).await?;
        let proposal = decide_invite(actor, &team, &event, invitee, invitee_team, pending)?;

        let invitation = self.stores.teams.create_invitation(proposal).await?;
        tracing::info!(invitation_id = %invitation.id, team_id = %team.id, "participant invited");
        Ok(invitation)
    }

    pub async fn respond_invitation(
        &self,
        actor: &Identity,
        id: InvitationId,
        decision: ProposalDecision,
    ) -> DomainResult<TeamInvitation> {
        let invitation = found(self.stores.teams.find_invitation(id).await?, "team invitation")?;
        let team = self.team(invitation.team_id).await?;
        let event = self.event(team.event_id).await?;
        let invitee_team = self
            .stores
            .teams
            .membership(event.id, invitation.participant_id)
            .await?;

        let outcome = decide_respond_invitation(actor, &invitation, &event, decision, invitee_team)?;
        let invitation = match outcome {
            ProposalStatus::Accepted => self.stores.teams.accept_invitation(id).await?,
            ProposalStatus::Rejected => self.stores.teams.reject_invitation(id).await?,
            ProposalStatus::Pending => return Err(DomainError::internal("invitation left pending")),
        };
        tracing::info!(invitation_id = %id, status = outcome.as_str(), "invitation answered");
        Ok(invitation)
    }

    pub async fn request_join(&self, actor: &Identity, team_id: TeamId) -> DomainResult<TeamRequest> {
        let team = self.team(team_id).await?;
        let event = self.event(team.event_id).await?;
        let requester = actor.participant_id().ok_or(DomainError::Forbidden)?;

        let actor_team = self.stores.teams.membership(event.id, requester).await?;
        let pending = self.stores.teams.pending_request_exists(team.id, requester).await?;
        let proposal = decide_request_join(actor, &team, &event, actor_team, pending)?;

        let request = self.stores.teams.create_request(proposal).await?;
        tracing::info!(request_id = %request.id, team_id = %team.id, "join requested");
        Ok(request)
    }

    pub async fn respond_request(
        &self,
        actor: &Identity,
        id: JoinRequestId,
        decision: ProposalDecision,
    ) -> DomainResult<TeamRequest> {
        let request = found(self.stores.teams.find_request(id).await?, "team request")?;
        let team = self.team(request.team_id).await?;
        let event = self.event(team.event_id).await?;
        let requester_team = self
            .stores
            .teams
            .membership(event.id, request.participant_id)
            .await?;

        let outcome = decide_respond_request(actor, &team, &request, &event, decision, requester_team)?;
        let request = match outcome {
            ProposalStatus::Accepted => self.stores.teams.approve_request(id).await?,
            ProposalStatus::Rejected => self.stores.teams.reject_request(id).await?,
            ProposalStatus::Pending => return Err(DomainError::internal("join request left pending")),
        };
        tracing::info!(request_id = %id, status = outcome.as_str(), "join request answered");
        Ok(request)
    }

    async fn team(&self, id: TeamId) -> DomainResult<Team> {
        found(self.stores.teams.find_team(id).await?, "team")
    }

    async fn event(&self, id: EventId) -> DomainResult<Event> {
        found(self.stores.events.find_event(id).await?, "event")
    }

    async fn membership_of(
        &self,
        event_id: EventId,
        participant: Option<ParticipantId>,
    ) -> DomainResult<Option<TeamId>> {
        match participant {
            Some(pid) => self.stores.teams.membership(event_id, pid).await,
            None => Ok(None),
        }
    }
}
