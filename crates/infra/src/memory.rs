//! In-memory backend for tests and dev mode.
//!
//! All tables live behind one `RwLock`; every unit of work takes the write
//! lock once, so it either fully applies or leaves nothing behind.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use hackathon_auth::{Identity, ParticipantProfile, Role, UserLookup};
use hackathon_core::{
    AssessmentId, CriterionId, DomainError, DomainResult, EventId, InvitationId, JoinRequestId,
    Pagination, ParticipantId, ProjectId, RegionId, SortDirection, TeamId, TechnologyId, UserId,
};
use hackathon_events::{
    CreateEvent, Event, EventStatus, Region, StaffAssignment, StaffKind, latest,
};
use hackathon_projects::{
    Criterion, NewAssessment, NewProject, Project, ProjectAssessment, ProjectChanges, ProjectQuery,
    ProjectStatus, Technology, ensure_deactivatable,
};
use hackathon_teams::{
    NewProposal, NewTeam, ProposalStatus, Team, TeamInvitation, TeamMember, TeamRequest,
};

use crate::store::{
    AssessmentStore, EventStore, ProjectStore, ReferenceStore, TeamStore, UserStore,
};

#[derive(Debug, Default)]
struct Sequences(HashMap<&'static str, i64>);

impl Sequences {
    fn next(&mut self, table: &'static str) -> i64 {
        let n = self.0.entry(table).or_insert(0);
        *n += 1;
        *n
    }
}

#[derive(Debug, Default)]
struct Tables {
    seq: Sequences,
    users: BTreeMap<UserId, Identity>,
    events: BTreeMap<EventId, Event>,
    staff: HashSet<StaffAssignment>,
    teams: BTreeMap<TeamId, Team>,
    members: Vec<TeamMember>,
    invitations: BTreeMap<InvitationId, TeamInvitation>,
    requests: BTreeMap<JoinRequestId, TeamRequest>,
    projects: BTreeMap<ProjectId, Project>,
    assessments: Vec<ProjectAssessment>,
    regions: Vec<Region>,
    technologies: Vec<Technology>,
    criteria: BTreeMap<CriterionId, Criterion>,
}

impl Tables {
    fn membership(&self, event_id: EventId, participant: ParticipantId) -> Option<TeamId> {
        self.members
            .iter()
            .filter(|m| m.participant_id == participant)
            .find(|m| {
                self.teams
                    .get(&m.team_id)
                    .is_some_and(|t| t.event_id == event_id)
            })
            .map(|m| m.team_id)
    }

    /// Adds a roster row, enforcing one team per participant per event.
    fn add_member(&mut self, team_id: TeamId, participant: ParticipantId) -> DomainResult<()> {
        let event_id = self
            .teams
            .get(&team_id)
            .map(|t| t.event_id)
            .ok_or(DomainError::not_found("team"))?;
        if self.membership(event_id, participant).is_some() {
            return Err(DomainError::conflict(
                "participant already belongs to a team for this event",
            ));
        }
        self.members.push(TeamMember {
            team_id,
            participant_id: participant,
            joined_at: Utc::now(),
        });
        Ok(())
    }
}

/// `RwLock`-guarded tables implementing every store trait.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| DomainError::internal("store lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| DomainError::internal("store lock poisoned"))
    }

    /// Seed a staff or admin account.
    pub fn add_user(&self, email: &str, role: Role) -> DomainResult<Identity> {
        let mut t = self.write()?;
        let id = UserId::new(t.seq.next("users"));
        let participant = match role {
            Role::Participant => Some(ParticipantProfile {
                id: ParticipantId::new(t.seq.next("participants")),
                name: email.split('@').next().unwrap_or(email).to_string(),
            }),
            _ => None,
        };
        let identity = Identity {
            id,
            email: email.to_string(),
            role,
            participant,
        };
        t.users.insert(id, identity.clone());
        Ok(identity)
    }

    /// Seed a participant account with a display name.
    pub fn add_participant(&self, email: &str, name: &str) -> DomainResult<Identity> {
        let mut identity = self.add_user(email, Role::Participant)?;
        let mut t = self.write()?;
        if let Some(profile) = identity.participant.as_mut() {
            profile.name = name.to_string();
        }
        t.users.insert(identity.id, identity.clone());
        Ok(identity)
    }

    pub fn add_region(&self, name: &str) -> DomainResult<Region> {
        let mut t = self.write()?;
        let region = Region {
            id: RegionId::new(t.seq.next("regions")),
            name: name.to_string(),
        };
        t.regions.push(region.clone());
        Ok(region)
    }

    pub fn add_technology(&self, name: &str) -> DomainResult<Technology> {
        let mut t = self.write()?;
        let tech = Technology {
            id: TechnologyId::new(t.seq.next("technologies")),
            name: name.to_string(),
        };
        t.technologies.push(tech.clone());
        Ok(tech)
    }
}

fn page_of<T: Clone>(rows: impl Iterator<Item = T>, pagination: &Pagination) -> (Vec<T>, u64) {
    let mut all: Vec<T> = rows.collect();
    if pagination.direction == SortDirection::Desc {
        all.reverse();
    }
    let total = all.len() as u64;
    (pagination.apply(all), total)
}

#[async_trait]
impl UserLookup for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Identity>> {
        let t = self.read()?;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_user(&self, id: UserId) -> DomainResult<Option<Identity>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_participant(&self, id: ParticipantId) -> DomainResult<Option<ParticipantProfile>> {
        let t = self.read()?;
        Ok(t
            .users
            .values()
            .filter_map(|u| u.participant.as_ref())
            .find(|p| p.id == id)
            .cloned())
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn list_events(&self, pagination: &Pagination) -> DomainResult<(Vec<Event>, u64)> {
        let t = self.read()?;
        Ok(page_of(t.events.values().cloned(), pagination))
    }

    async fn find_event(&self, id: EventId) -> DomainResult<Option<Event>> {
        Ok(self.read()?.events.get(&id).cloned())
    }

    async fn latest_event(&self) -> DomainResult<Option<Event>> {
        let t = self.read()?;
        let events: Vec<Event> = t.events.values().cloned().collect();
        Ok(latest(&events).cloned())
    }

    async fn create_event(&self, request: &CreateEvent) -> DomainResult<Event> {
        let mut t = self.write()?;
        if let Some(region) = request.region_id {
            if !t.regions.iter().any(|r| r.id == region) {
                return Err(DomainError::not_found("region"));
            }
        }
        let event = Event {
            id: EventId::new(t.seq.next("events")),
            name: request.name.trim().to_string(),
            description: request.description.clone(),
            region_id: request.region_id,
            start_date: request.start_date,
            end_date: request.end_date,
            status: EventStatus::Created,
            created_at: Utc::now(),
        };
        t.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn set_event_status(&self, id: EventId, status: EventStatus) -> DomainResult<Event> {
        let mut t = self.write()?;
        let event = t.events.get_mut(&id).ok_or(DomainError::not_found("event"))?;
        event.status = status;
        Ok(event.clone())
    }

    async fn add_staff(&self, assignment: StaffAssignment) -> DomainResult<()> {
        let mut t = self.write()?;
        if !t.events.contains_key(&assignment.event_id) {
            return Err(DomainError::not_found("event"));
        }
        if !t.staff.insert(assignment) {
            return Err(DomainError::conflict(format!(
                "user is already a {} for this event",
                assignment.kind.as_str()
            )));
        }
        Ok(())
    }

    async fn is_staff(&self, event_id: EventId, user_id: UserId, kind: StaffKind) -> DomainResult<bool> {
        Ok(self.read()?.staff.contains(&StaffAssignment {
            event_id,
            user_id,
            kind,
        }))
    }
}

#[async_trait]
impl TeamStore for InMemoryStore {
    async fn find_team(&self, id: TeamId) -> DomainResult<Option<Team>> {
        Ok(self.read()?.teams.get(&id).cloned())
    }

    async fn list_teams(
        &self,
        event_id: Option<EventId>,
        pagination: &Pagination,
    ) -> DomainResult<(Vec<Team>, u64)> {
        let t = self.read()?;
        let rows = t
            .teams
            .values()
            .filter(|team| event_id.is_none_or(|e| team.event_id == e))
            .cloned();
        Ok(page_of(rows, pagination))
    }

    async fn team_members(&self, team_id: TeamId) -> DomainResult<Vec<TeamMember>> {
        let t = self.read()?;
        Ok(t.members.iter().filter(|m| m.team_id == team_id).cloned().collect())
    }

    async fn membership(&self, event_id: EventId, participant: ParticipantId) -> DomainResult<Option<TeamId>> {
        Ok(self.read()?.membership(event_id, participant))
    }

    async fn create_team_with_owner(&self, new: NewTeam) -> DomainResult<Team> {
        let mut t = self.write()?;
        if t.membership(new.event_id, new.owner_id).is_some() {
            return Err(DomainError::conflict(
                "participant already belongs to a team for this event",
            ));
        }
        let team = Team {
            id: TeamId::new(t.seq.next("teams")),
            event_id: new.event_id,
            owner_id: new.owner_id,
            name: new.name,
            created_at: Utc::now(),
        };
        t.teams.insert(team.id, team.clone());
        t.add_member(team.id, team.owner_id)?;
        Ok(team)
    }

    async fn find_invitation(&self, id: InvitationId) -> DomainResult<Option<TeamInvitation>> {
        Ok(self.read()?.invitations.get(&id).cloned())
    }

    async fn pending_invitation_exists(&self, team_id: TeamId, participant: ParticipantId) -> DomainResult<bool> {
        let t = self.read()?;
        Ok(t.invitations.values().any(|i| {
            i.team_id == team_id && i.participant_id == participant && i.status == ProposalStatus::Pending
        }))
    }

    async fn create_invitation(&self, proposal: NewProposal) -> DomainResult<TeamInvitation> {
        let mut t = self.write()?;
        let invitation = TeamInvitation {
            id: InvitationId::new(t.seq.next("invitations")),
            team_id: proposal.team_id,
            participant_id: proposal.participant_id,
            status: ProposalStatus::Pending,
            created_at: Utc::now(),
        };
        t.invitations.insert(invitation.id, invitation.clone());
        Ok(invitation)
    }

    async fn accept_invitation(&self, id: InvitationId) -> DomainResult<TeamInvitation> {
        let mut t = self.write()?;
        let invitation = t
            .invitations
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("team invitation"))?;
        if invitation.status != ProposalStatus::Pending {
            return Err(DomainError::invalid_status("invitation is no longer pending"));
        }
        t.add_member(invitation.team_id, invitation.participant_id)?;
        let stored = t
            .invitations
            .get_mut(&id)
            .ok_or(DomainError::not_found("team invitation"))?;
        stored.status = ProposalStatus::Accepted;
        Ok(stored.clone())
    }

    async fn reject_invitation(&self, id: InvitationId) -> DomainResult<TeamInvitation> {
        let mut t = self.write()?;
        let stored = t
            .invitations
            .get_mut(&id)
            .ok_or(DomainError::not_found("team invitation"))?;
        if stored.status != ProposalStatus::Pending {
            return Err(DomainError::invalid_status("invitation is no longer pending"));
        }
        stored.status = ProposalStatus::Rejected;
        Ok(stored.clone())
    }

    async fn find_request(&self, id: JoinRequestId) -> DomainResult<Option<TeamRequest>> {
        Ok(self.read()?.requests.get(&id).cloned())
    }

    async fn pending_request_exists(&self, team_id: TeamId, participant: ParticipantId) -> DomainResult<bool> {
        let t = self.read()?;
        Ok(t.requests.values().any(|r| {
            r.team_id == team_id && r.participant_id == participant && r.status == ProposalStatus::Pending
        }))
    }

    async fn create_request(&self, proposal: NewProposal) -> DomainResult<TeamRequest> {
        let mut t = self.write()?;
        let request = TeamRequest {
            id: JoinRequestId::new(t.seq.next("requests")),
            team_id: proposal.team_id,
            participant_id: proposal.participant_id,
            status: ProposalStatus::Pending,
            created_at: Utc::now(),
        };
        t.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn approve_request(&self, id: JoinRequestId) -> DomainResult<TeamRequest> {
        let mut t = self.write()?;
        let request = t
            .requests
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("team request"))?;
        if request.status != ProposalStatus::Pending {
            return Err(DomainError::invalid_status("request is no longer pending"));
        }
        t.add_member(request.team_id, request.participant_id)?;
        let stored = t
            .requests
            .get_mut(&id)
            .ok_or(DomainError::not_found("team request"))?;
        stored.status = ProposalStatus::Accepted;
        Ok(stored.clone())
    }

    async fn reject_request(&self, id: JoinRequestId) -> DomainResult<TeamRequest> {
        let mut t = self.write()?;
        let stored = t
            .requests
            .get_mut(&id)
            .ok_or(DomainError::not_found("team request"))?;
        if stored.status != ProposalStatus::Pending {
            return Err(DomainError::invalid_status("request is no longer pending"));
        }
        stored.status = ProposalStatus::Rejected;
        Ok(stored.clone())
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn find_project(&self, id: ProjectId) -> DomainResult<Option<Project>> {
        Ok(self.read()?.projects.get(&id).cloned())
    }

    async fn find_team_project(&self, team_id: TeamId, event_id: EventId) -> DomainResult<Option<Project>> {
        let t = self.read()?;
        Ok(t
            .projects
            .values()
            .find(|p| p.team_id == team_id && p.event_id == event_id)
            .cloned())
    }

    async fn list_projects(&self, query: &ProjectQuery) -> DomainResult<(Vec<Project>, u64)> {
        let t = self.read()?;
        Ok(query.run(t.projects.values().cloned()))
    }

    async fn create_project(&self, new: NewProject) -> DomainResult<Project> {
        let mut t = self.write()?;
        if t
            .projects
            .values()
            .any(|p| p.team_id == new.team_id && p.event_id == new.event_id)
        {
            return Err(DomainError::TeamAlreadyHasProject);
        }
        let id = ProjectId::new(t.seq.next("projects"));
        let project = new.into_project(id, Utc::now());
        t.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn apply_project_changes(&self, changes: &ProjectChanges) -> DomainResult<Project> {
        let mut t = self.write()?;
        let project = t
            .projects
            .get_mut(&changes.project_id)
            .ok_or(DomainError::not_found("project"))?;
        if project.status != ProjectStatus::Draft {
            return Err(DomainError::ProjectStatusShouldBeDraft);
        }
        changes.apply_to(project, Utc::now());
        Ok(project.clone())
    }

    async fn deactivate_project(&self, id: ProjectId) -> DomainResult<Project> {
        let mut t = self.write()?;
        let project = t.projects.get_mut(&id).ok_or(DomainError::not_found("project"))?;
        ensure_deactivatable(project.status)?;
        project.status = ProjectStatus::Inactive;
        project.updated_at = Utc::now();
        Ok(project.clone())
    }
}

#[async_trait]
impl AssessmentStore for InMemoryStore {
    async fn list_assessments(&self, project_id: ProjectId) -> DomainResult<Vec<ProjectAssessment>> {
        let t = self.read()?;
        Ok(t
            .assessments
            .iter()
            .filter(|a| a.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn submit_assessments(
        &self,
        project_id: ProjectId,
        batch: Vec<NewAssessment>,
    ) -> DomainResult<Vec<ProjectAssessment>> {
        let mut t = self.write()?;
        match t.projects.get(&project_id) {
            None => return Err(DomainError::not_found("project")),
            Some(p) if p.status != ProjectStatus::Submitted => {
                return Err(DomainError::ProjectStatusShouldBeSubmitted);
            }
            Some(_) => {}
        }
        if let Some(missing) = batch.iter().find(|a| !t.criteria.contains_key(&a.criterion_id)) {
            return Err(DomainError::validation(format!(
                "criterion {} does not exist",
                missing.criterion_id
            )));
        }

        let now = Utc::now();
        let mut inserted = Vec::with_capacity(batch.len());
        for a in batch {
            let row = ProjectAssessment {
                id: AssessmentId::new(t.seq.next("assessments")),
                project_id,
                judge_id: a.judge_id,
                criterion_id: a.criterion_id,
                score: a.score,
                created_at: now,
            };
            inserted.push(row);
        }
        t.assessments.extend(inserted.iter().cloned());
        if let Some(project) = t.projects.get_mut(&project_id) {
            project.status = ProjectStatus::Assessed;
            project.updated_at = now;
        }
        Ok(inserted)
    }
}

#[async_trait]
impl ReferenceStore for InMemoryStore {
    async fn list_regions(&self) -> DomainResult<Vec<Region>> {
        Ok(self.read()?.regions.clone())
    }

    async fn list_technologies(&self) -> DomainResult<Vec<Technology>> {
        Ok(self.read()?.technologies.clone())
    }

    async fn known_technologies(&self, ids: &[TechnologyId]) -> DomainResult<HashSet<TechnologyId>> {
        let t = self.read()?;
        Ok(t
            .technologies
            .iter()
            .map(|tech| tech.id)
            .filter(|id| ids.contains(id))
            .collect())
    }

    async fn list_criteria(&self) -> DomainResult<Vec<Criterion>> {
        Ok(self.read()?.criteria.values().cloned().collect())
    }

    async fn criterion_ids(&self) -> DomainResult<HashSet<CriterionId>> {
        Ok(self.read()?.criteria.keys().copied().collect())
    }

    async fn create_criterion(&self, name: &str) -> DomainResult<Criterion> {
        let mut t = self.write()?;
        if t.criteria.values().any(|c| c.name.eq_ignore_ascii_case(name)) {
            return Err(DomainError::conflict(format!("criterion {name} already exists")));
        }
        let criterion = Criterion {
            id: CriterionId::new(t.seq.next("criteria")),
            name: name.to_string(),
        };
        t.criteria.insert(criterion.id, criterion.clone());
        Ok(criterion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;

    async fn running_event(store: &InMemoryStore) -> Event {
        let day = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let event = store
            .create_event(&CreateEvent {
                name: "Spring Hack".to_string(),
                description: None,
                region_id: None,
                start_date: day,
                end_date: day,
            })
            .await
            .unwrap();
        store.set_event_status(event.id, EventStatus::Running).await.unwrap()
    }

    fn new_project(team: &Team) -> NewProject {
        NewProject {
            team_id: team.id,
            event_id: team.event_id,
            name: "Rover".to_string(),
            description: None,
            repository_url: None,
            status: ProjectStatus::Submitted,
            technologies: vec![],
            submitted_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn team_creation_adds_owner_to_roster() {
        let store = InMemoryStore::new();
        let event = running_event(&store).await;
        let owner = store.add_participant("ada@example.com", "Ada").unwrap();
        let pid = owner.participant_id().unwrap();

        let team = store
            .create_team_with_owner(NewTeam {
                event_id: event.id,
                owner_id: pid,
                name: "Rustaceans".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(store.membership(event.id, pid).await.unwrap(), Some(team.id));
        assert_eq!(store.team_members(team.id).await.unwrap().len(), 1);

        let err = store
            .create_team_with_owner(NewTeam {
                event_id: event.id,
                owner_id: pid,
                name: "Again".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        let (teams, total) = store.list_teams(Some(event.id), &Pagination::default()).await.unwrap();
        assert_eq!((teams.len(), total), (1, 1));
    }

    #[tokio::test]
    async fn failed_acceptance_leaves_invitation_pending() {
        let store = InMemoryStore::new();
        let event = running_event(&store).await;
        let a = store.add_participant("a@example.com", "A").unwrap().participant_id().unwrap();
        let b = store.add_participant("b@example.com", "B").unwrap().participant_id().unwrap();

        let team_a = store
            .create_team_with_owner(NewTeam { event_id: event.id, owner_id: a, name: "A".into() })
            .await
            .unwrap();
        store
            .create_team_with_owner(NewTeam { event_id: event.id, owner_id: b, name: "B".into() })
            .await
            .unwrap();

        let invitation = store
            .create_invitation(NewProposal { team_id: team_a.id, participant_id: b })
            .await
            .unwrap();
        let err = store.accept_invitation(invitation.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let after = store.find_invitation(invitation.id).await.unwrap().unwrap();
        assert_eq!(after.status, ProposalStatus::Pending);
        assert_eq!(store.team_members(team_a.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_project_for_team_is_rejected() {
        let store = InMemoryStore::new();
        let event = running_event(&store).await;
        let a = store.add_participant("a@example.com", "A").unwrap().participant_id().unwrap();
        let team = store
            .create_team_with_owner(NewTeam { event_id: event.id, owner_id: a, name: "A".into() })
            .await
            .unwrap();

        store.create_project(new_project(&team)).await.unwrap();
        let err = store.create_project(new_project(&team)).await.unwrap_err();
        assert_eq!(err, DomainError::TeamAlreadyHasProject);
    }

    #[tokio::test]
    async fn assessment_batch_is_all_or_nothing() {
        let store = InMemoryStore::new();
        let event = running_event(&store).await;
        let a = store.add_participant("a@example.com", "A").unwrap().participant_id().unwrap();
        let judge = store.add_user("judge@example.com", Role::Judge).unwrap();
        let team = store
            .create_team_with_owner(NewTeam { event_id: event.id, owner_id: a, name: "A".into() })
            .await
            .unwrap();
        let project = store.create_project(new_project(&team)).await.unwrap();
        let c1 = store.create_criterion("Impact").await.unwrap();

        let bad = vec![
            NewAssessment { project_id: project.id, judge_id: judge.id, criterion_id: c1.id, score: 80 },
            NewAssessment {
                project_id: project.id,
                judge_id: judge.id,
                criterion_id: CriterionId::new(99),
                score: 10,
            },
        ];
        assert!(store.submit_assessments(project.id, bad).await.is_err());
        assert!(store.list_assessments(project.id).await.unwrap().is_empty());
        assert_eq!(
            store.find_project(project.id).await.unwrap().unwrap().status,
            ProjectStatus::Submitted
        );

        let good = vec![NewAssessment {
            project_id: project.id,
            judge_id: judge.id,
            criterion_id: c1.id,
            score: 80,
        }];
        store.submit_assessments(project.id, good.clone()).await.unwrap();
        assert_eq!(
            store.find_project(project.id).await.unwrap().unwrap().status,
            ProjectStatus::Assessed
        );
        assert_eq!(
            store.submit_assessments(project.id, good).await,
            Err(DomainError::ProjectStatusShouldBeSubmitted)
        );
    }

    #[tokio::test]
    async fn assessed_project_cannot_be_deactivated() {
        let store = InMemoryStore::new();
        let event = running_event(&store).await;
        let a = store.add_participant("a@example.com", "A").unwrap().participant_id().unwrap();
        let judge = store.add_user("judge@example.com", Role::Judge).unwrap();
        let team = store
            .create_team_with_owner(NewTeam { event_id: event.id, owner_id: a, name: "A".into() })
            .await
            .unwrap();
        let project = store.create_project(new_project(&team)).await.unwrap();
        let c1 = store.create_criterion("Impact").await.unwrap();
        store
            .submit_assessments(
                project.id,
                vec![NewAssessment { project_id: project.id, judge_id: judge.id, criterion_id: c1.id, score: 70 }],
            )
            .await
            .unwrap();

        let err = store.deactivate_project(project.id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidStatus(_)));
        assert_eq!(
            store.find_project(project.id).await.unwrap().unwrap().status,
            ProjectStatus::Assessed
        );
        assert_eq!(
            store.deactivate_project(ProjectId::new(404)).await.unwrap_err(),
            DomainError::not_found("project")
        );
    }

    #[tokio::test]
    async fn submitted_project_is_deactivated() {
        let store = InMemoryStore::new();
        let event = running_event(&store).await;
        let a = store.add_participant("a@example.com", "A").unwrap().participant_id().unwrap();
        let team = store
            .create_team_with_owner(NewTeam { event_id: event.id, owner_id: a, name: "A".into() })
            .await
            .unwrap();
        let project = store.create_project(new_project(&team)).await.unwrap();

        let inactive = store.deactivate_project(project.id).await.unwrap();
        assert_eq!(inactive.status, ProjectStatus::Inactive);
        assert!(store.deactivate_project(project.id).await.is_err());
    }

    #[tokio::test]
    async fn concurrent_batches_assess_exactly_once() {
        let store = Arc::new(InMemoryStore::new());
        let event = running_event(&store).await;
        let a = store.add_participant("a@example.com", "A").unwrap().participant_id().unwrap();
        let team = store
            .create_team_with_owner(NewTeam { event_id: event.id, owner_id: a, name: "A".into() })
            .await
            .unwrap();
        let project = store.create_project(new_project(&team)).await.unwrap();
        let c1 = store.create_criterion("Impact").await.unwrap();

        let mut handles = Vec::new();
        for judge in 1..=8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .submit_assessments(
                        project.id,
                        vec![NewAssessment {
                            project_id: project.id,
                            judge_id: UserId::new(100 + judge),
                            criterion_id: c1.id,
                            score: 50,
                        }],
                    )
                    .await
            }));
        }
        let mut ok = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.list_assessments(project.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn project_changes_replace_technologies() {
        let store = InMemoryStore::new();
        let event = running_event(&store).await;
        let a = store.add_participant("a@example.com", "A").unwrap().participant_id().unwrap();
        let team = store
            .create_team_with_owner(NewTeam { event_id: event.id, owner_id: a, name: "A".into() })
            .await
            .unwrap();
        let mut draft = new_project(&team);
        draft.status = ProjectStatus::Draft;
        draft.submitted_at = None;
        draft.technologies = vec![TechnologyId::new(1), TechnologyId::new(2)];
        let project = store.create_project(draft).await.unwrap();

        let changes = ProjectChanges {
            project_id: project.id,
            name: "Rover II".to_string(),
            description: None,
            repository_url: None,
            status: ProjectStatus::Draft,
            submitted_at: None,
            added_technologies: vec![TechnologyId::new(3)],
            removed_technologies: vec![TechnologyId::new(1)],
        };
        let updated = store.apply_project_changes(&changes).await.unwrap();
        assert_eq!(updated.technologies, vec![TechnologyId::new(2), TechnologyId::new(3)]);
        assert_eq!(updated.name, "Rover II");
    }
}
