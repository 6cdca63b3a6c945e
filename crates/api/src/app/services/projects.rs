use chrono::Utc;

use hackathon_auth::{Identity, Role};
use hackathon_core::{DomainError, DomainResult, EventId, Page, ProjectId, TeamId, TechnologyId};
use hackathon_events::Event;
use hackathon_infra::Stores;
use hackathon_projects::{
    CreateProject, Project, ProjectQuery, UpdateProject, can_view_detail, decide_create,
    decide_deactivate, decide_update,
};
use hackathon_teams::Team;

use super::found;

pub struct ProjectService {
    stores: Stores,
}

impl ProjectService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn list(&self, query: ProjectQuery) -> DomainResult<Page<Project>> {
        let (items, total) = self.stores.projects.list_projects(&query).await?;
        Ok(Page::new(items, total, &query.pagination))
    }

    /// Project detail with its team. Participants must be on that team.
    pub async fn get(&self, actor: &Identity, id: ProjectId) -> DomainResult<(Project, Team)> {
        let project = self.project(id).await?;
        let team = self.team(project.team_id).await?;

        let is_member = match actor.role {
            Role::Participant => self.is_member(actor, &team).await,
            _ => true,
        };
        can_view_detail(actor, is_member)?;
        Ok((project, team))
    }

    pub async fn create(&self, actor: &Identity, request: CreateProject) -> DomainResult<Project> {
        let team = self.team(request.team_id).await?;
        let event = self.event(request.event_id).await?;
        let existing = self
            .stores
            .projects
            .find_team_project(team.id, event.id)
            .await?;

        let new_project = decide_create(actor, &team, &event, existing.as_ref(), &request, Utc::now())?;
        self.ensure_known_technologies(&new_project.technologies).await?;

        let project = self.stores.projects.create_project(new_project).await?;
        tracing::info!(project_id = %project.id, team_id = %team.id, status = %project.status, "project created");
        Ok(project)
    }

    pub async fn update(&self, actor: &Identity, id: ProjectId, request: UpdateProject) -> DomainResult<Project> {
        let project = self.project(id).await?;
        let team = self.team(project.team_id).await?;
        let event = self.event(project.event_id).await?;

        let changes = decide_update(actor, &project, &team, &event, &request, Utc::now())?;
        self.ensure_known_technologies(&changes.added_technologies).await?;

        let project = self.stores.projects.apply_project_changes(&changes).await?;
        tracing::info!(
            project_id = %id,
            status = %project.status,
            added = changes.added_technologies.len(),
            removed = changes.removed_technologies.len(),
            "project updated"
        );
        Ok(project)
    }

    /// Admin status change; only deactivation is accepted.
    pub async fn set_status(&self, id: ProjectId, target: &str) -> DomainResult<Project> {
        let project = self.project(id).await?;
        let event = self.event(project.event_id).await?;
        decide_deactivate(&project, &event, target.trim())?;
        let project = self.stores.projects.deactivate_project(id).await?;
        tracing::info!(project_id = %id, status = %project.status, "project status changed");
        Ok(project)
    }

    async fn is_member(&self, actor: &Identity, team: &Team) -> bool {
        let Some(pid) = actor.participant_id() else {
            return false;
        };
        match self.stores.teams.team_members(team.id).await {
            Ok(members) => members.iter().any(|m| m.participant_id == pid),
            Err(err) => {
                tracing::warn!(team_id = %team.id, error = %err, "membership lookup failed");
                false
            }
        }
    }

    async fn ensure_known_technologies(&self, ids: &[TechnologyId]) -> DomainResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let known = self.stores.reference.known_technologies(ids).await?;
        match ids.iter().find(|id| !known.contains(id)) {
            Some(_) => Err(DomainError::not_found("technology")),
            None => Ok(()),
        }
    }

    async fn project(&self, id: ProjectId) -> DomainResult<Project> {
        found(self.stores.projects.find_project(id).await?, "project")
    }

    async fn team(&self, id: TeamId) -> DomainResult<Team> {
        found(self.stores.teams.find_team(id).await?, "team")
    }

    async fn event(&self, id: EventId) -> DomainResult<Event> {
        found(self.stores.events.find_event(id).await?, "event")
    }
}
