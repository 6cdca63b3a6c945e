//! Project lifecycle decisions.
//!
//! Each function checks its preconditions in a fixed order so the first
//! failing rule decides the error the caller sees.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use hackathon_auth::{Identity, Role};
use hackathon_core::{DomainError, DomainResult};
use hackathon_events::Event;
use hackathon_teams::Team;

use crate::project::{
    dedup_technologies, ensure_team_settable, normalize_name, normalize_optional,
};
use crate::{CreateProject, NewProject, Project, ProjectChanges, ProjectStatus, UpdateProject};

/// Decide project creation for `team` in `event`.
///
/// `existing` is the project the team already has in this event, if any.
pub fn decide_create(
    actor: &Identity,
    team: &Team,
    event: &Event,
    existing: Option<&Project>,
    request: &CreateProject,
    now: DateTime<Utc>,
) -> DomainResult<NewProject> {
    event.ensure_running()?;
    team.ensure_owner(actor)?;
    if existing.is_some() {
        return Err(DomainError::TeamAlreadyHasProject);
    }
    if team.event_id != event.id || request.event_id != event.id || request.team_id != team.id {
        return Err(DomainError::validation("team is not registered for this event"));
    }

    let name = normalize_name(&request.name)?;
    ensure_team_settable(request.status)?;

    let submitted_at = (request.status == ProjectStatus::Submitted).then_some(now);

    Ok(NewProject {
        team_id: team.id,
        event_id: event.id,
        name,
        description: normalize_optional(request.description.as_deref()),
        repository_url: normalize_optional(request.repository_url.as_deref()),
        status: request.status,
        technologies: dedup_technologies(&request.technology_ids),
        submitted_at,
    })
}

/// Decide a team edit of a draft project.
pub fn decide_update(
    actor: &Identity,
    project: &Project,
    team: &Team,
    event: &Event,
    request: &UpdateProject,
    now: DateTime<Utc>,
) -> DomainResult<ProjectChanges> {
    if project.status != ProjectStatus::Draft {
        return Err(DomainError::ProjectStatusShouldBeDraft);
    }
    event.ensure_running()?;
    if team.id != project.team_id {
        return Err(DomainError::Forbidden);
    }
    team.ensure_owner(actor)?;

    let name = match &request.name {
        Some(n) => normalize_name(n)?,
        None => project.name.clone(),
    };
    let status = request.status.unwrap_or(project.status);
    ensure_team_settable(status)?;

    let submitted_at = match (status, project.submitted_at) {
        (ProjectStatus::Submitted, None) => Some(now),
        (_, prev) => prev,
    };

    let (added, removed) = match &request.technology_ids {
        Some(ids) => {
            let next: BTreeSet<_> = ids.iter().copied().collect();
            let current: BTreeSet<_> = project.technologies.iter().copied().collect();
            (
                next.difference(&current).copied().collect(),
                current.difference(&next).copied().collect(),
            )
        }
        None => (Vec::new(), Vec::new()),
    };

    Ok(ProjectChanges {
        project_id: project.id,
        name,
        description: match &request.description {
            Some(d) => normalize_optional(Some(d)),
            None => project.description.clone(),
        },
        repository_url: match &request.repository_url {
            Some(u) => normalize_optional(Some(u)),
            None => project.repository_url.clone(),
        },
        status,
        submitted_at,
        added_technologies: added,
        removed_technologies: removed,
    })
}

/// Decide an admin deactivation. `target` is the raw requested status.
pub fn decide_deactivate(project: &Project, event: &Event, target: &str) -> DomainResult<ProjectStatus> {
    if target != ProjectStatus::Inactive.as_str() {
        return Err(DomainError::invalid_status(format!(
            "projects can only be set to inactive, got {target}"
        )));
    }
    event.ensure_running()?;
    ensure_deactivatable(project.status)?;
    Ok(ProjectStatus::Inactive)
}

/// Only draft and submitted projects can become inactive. Stores re-check this
/// against the current row when they write.
pub fn ensure_deactivatable(status: ProjectStatus) -> DomainResult<()> {
    match status {
        ProjectStatus::Draft | ProjectStatus::Submitted => Ok(()),
        other => Err(DomainError::invalid_status(format!(
            "cannot deactivate a {other} project"
        ))),
    }
}

/// Participants only see projects of teams they belong to.
pub fn can_view_detail(identity: &Identity, is_member: bool) -> DomainResult<()> {
    match identity.role {
        Role::Participant if !is_member => Err(DomainError::Forbidden),
        _ => Ok(()),
    }
}
