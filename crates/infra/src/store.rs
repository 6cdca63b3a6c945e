//! Persistence collaborator boundary.
//!
//! Stores load and save; they perform no business validation. Each method that
//! touches more than one row is a unit of work and is all-or-nothing.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use hackathon_auth::{Identity, ParticipantProfile, UserLookup};
use hackathon_core::{
    CriterionId, DomainResult, EventId, InvitationId, JoinRequestId, Pagination, ParticipantId,
    ProjectId, TeamId, TechnologyId, UserId,
};
use hackathon_events::{CreateEvent, Event, EventStatus, Region, StaffAssignment, StaffKind};
use hackathon_projects::{
    Criterion, NewAssessment, NewProject, Project, ProjectAssessment, ProjectChanges, ProjectQuery,
    ProjectStatus, Technology,
};
use hackathon_teams::{NewProposal, NewTeam, Team, TeamInvitation, TeamMember, TeamRequest};

#[async_trait]
pub trait UserStore: UserLookup {
    async fn find_user(&self, id: UserId) -> DomainResult<Option<Identity>>;

    async fn find_participant(&self, id: ParticipantId) -> DomainResult<Option<ParticipantProfile>>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn list_events(&self, pagination: &Pagination) -> DomainResult<(Vec<Event>, u64)>;

    async fn find_event(&self, id: EventId) -> DomainResult<Option<Event>>;

    /// Newest event that is neither inactive nor rejected.
    async fn latest_event(&self) -> DomainResult<Option<Event>>;

    async fn create_event(&self, request: &CreateEvent) -> DomainResult<Event>;

    async fn set_event_status(&self, id: EventId, status: EventStatus) -> DomainResult<Event>;

    /// Registers a judge or mentor. Registering twice is a `Conflict`.
    async fn add_staff(&self, assignment: StaffAssignment) -> DomainResult<()>;

    async fn is_staff(&self, event_id: EventId, user_id: UserId, kind: StaffKind) -> DomainResult<bool>;
}

#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn find_team(&self, id: TeamId) -> DomainResult<Option<Team>>;

    async fn list_teams(
        &self,
        event_id: Option<EventId>,
        pagination: &Pagination,
    ) -> DomainResult<(Vec<Team>, u64)>;

    async fn team_members(&self, team_id: TeamId) -> DomainResult<Vec<TeamMember>>;

    /// The team `participant` belongs to in `event_id`, if any.
    async fn membership(&self, event_id: EventId, participant: ParticipantId) -> DomainResult<Option<TeamId>>;

    /// Inserts the team and the owner's membership together.
    async fn create_team_with_owner(&self, team: NewTeam) -> DomainResult<Team>;

    async fn find_invitation(&self, id: InvitationId) -> DomainResult<Option<TeamInvitation>>;

    async fn pending_invitation_exists(&self, team_id: TeamId, participant: ParticipantId) -> DomainResult<bool>;

    async fn create_invitation(&self, proposal: NewProposal) -> DomainResult<TeamInvitation>;

    /// Marks the invitation accepted and adds the invitee to the roster.
    async fn accept_invitation(&self, id: InvitationId) -> DomainResult<TeamInvitation>;

    async fn reject_invitation(&self, id: InvitationId) -> DomainResult<TeamInvitation>;

    async fn find_request(&self, id: JoinRequestId) -> DomainResult<Option<TeamRequest>>;

    async fn pending_request_exists(&self, team_id: TeamId, participant: ParticipantId) -> DomainResult<bool>;

    async fn create_request(&self, proposal: NewProposal) -> DomainResult<TeamRequest>;

    /// Marks the request accepted and adds the requester to the roster.
    async fn approve_request(&self, id: JoinRequestId) -> DomainResult<TeamRequest>;

    async fn reject_request(&self, id: JoinRequestId) -> DomainResult<TeamRequest>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn find_project(&self, id: ProjectId) -> DomainResult<Option<Project>>;

    async fn find_team_project(&self, team_id: TeamId, event_id: EventId) -> DomainResult<Option<Project>>;

    async fn list_projects(&self, query: &ProjectQuery) -> DomainResult<(Vec<Project>, u64)>;

    /// A second project for the same team and event is `TeamAlreadyHasProject`.
    async fn create_project(&self, project: NewProject) -> DomainResult<Project>;

    /// Writes the project row and its technology rows together.
    async fn apply_project_changes(&self, changes: &ProjectChanges) -> DomainResult<Project>;

    /// Sets the project inactive if it is still draft or submitted at write time.
    async fn deactivate_project(&self, id: ProjectId) -> DomainResult<Project>;
}

#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn list_assessments(&self, project_id: ProjectId) -> DomainResult<Vec<ProjectAssessment>>;

    /// Inserts the batch and moves the project from `submitted` to `assessed`.
    ///
    /// Fails with `ProjectStatusShouldBeSubmitted` if the project left
    /// `submitted` after the caller checked it.
    async fn submit_assessments(
        &self,
        project_id: ProjectId,
        batch: Vec<NewAssessment>,
    ) -> DomainResult<Vec<ProjectAssessment>>;
}

#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn list_regions(&self) -> DomainResult<Vec<Region>>;

    async fn list_technologies(&self) -> DomainResult<Vec<Technology>>;

    async fn known_technologies(&self, ids: &[TechnologyId]) -> DomainResult<HashSet<TechnologyId>>;

    async fn list_criteria(&self) -> DomainResult<Vec<Criterion>>;

    async fn criterion_ids(&self) -> DomainResult<HashSet<CriterionId>>;

    async fn create_criterion(&self, name: &str) -> DomainResult<Criterion>;
}

/// Every collaborator the services need, as trait objects.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub events: Arc<dyn EventStore>,
    pub teams: Arc<dyn TeamStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub assessments: Arc<dyn AssessmentStore>,
    pub reference: Arc<dyn ReferenceStore>,
}

impl Stores {
    /// Use one backend for every collaborator.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: UserStore
            + EventStore
            + TeamStore
            + ProjectStore
            + AssessmentStore
            + ReferenceStore
            + 'static,
    {
        Self {
            users: store.clone(),
            events: store.clone(),
            teams: store.clone(),
            projects: store.clone(),
            assessments: store.clone(),
            reference: store,
        }
    }

    /// The user store as the validator's lookup collaborator.
    pub fn user_lookup(&self) -> Arc<dyn UserLookup> {
        let users = self.users.clone();
        Arc::new(LookupAdapter(users))
    }
}

struct LookupAdapter(Arc<dyn UserStore>);

#[async_trait]
impl UserLookup for LookupAdapter {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Identity>> {
        self.0.find_by_email(email).await
    }
}
