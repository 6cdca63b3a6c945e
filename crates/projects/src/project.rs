use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use hackathon_core::{DomainError, DomainResult, EventId, ProjectId, TeamId, TechnologyId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Draft,
    Submitted,
    Assessed,
    Inactive,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Submitted => "submitted",
            ProjectStatus::Assessed => "assessed",
            ProjectStatus::Inactive => "inactive",
        }
    }

    /// Statuses a team may set directly through create/update.
    pub fn is_team_settable(&self) -> bool {
        matches!(self, ProjectStatus::Draft | ProjectStatus::Submitted)
    }
}

impl core::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProjectStatus::Draft),
            "submitted" => Ok(ProjectStatus::Submitted),
            "assessed" => Ok(ProjectStatus::Assessed),
            "inactive" => Ok(ProjectStatus::Inactive),
            other => Err(DomainError::invalid_status(other.to_string())),
        }
    }
}

/// Read-only lookup row attached to projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technology {
    pub id: TechnologyId,
    pub name: String,
}

/// A team's entry for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub team_id: TeamId,
    pub event_id: EventId,
    pub name: String,
    pub description: Option<String>,
    pub repository_url: Option<String>,
    pub status: ProjectStatus,
    pub technologies: Vec<TechnologyId>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create request. `name` is required; status defaults to draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProject {
    pub team_id: TeamId,
    pub event_id: EventId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub repository_url: Option<String>,
    #[serde(default = "default_status")]
    pub status: ProjectStatus,
    #[serde(default)]
    pub technology_ids: Vec<TechnologyId>,
}

fn default_status() -> ProjectStatus {
    ProjectStatus::Draft
}

/// Update request. Every field is optional; absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProject {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub repository_url: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub technology_ids: Option<Vec<TechnologyId>>,
}

/// A validated project, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub team_id: TeamId,
    pub event_id: EventId,
    pub name: String,
    pub description: Option<String>,
    pub repository_url: Option<String>,
    pub status: ProjectStatus,
    pub technologies: Vec<TechnologyId>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl NewProject {
    pub fn into_project(self, id: ProjectId, now: DateTime<Utc>) -> Project {
        Project {
            id,
            team_id: self.team_id,
            event_id: self.event_id,
            name: self.name,
            description: self.description,
            repository_url: self.repository_url,
            status: self.status,
            technologies: self.technologies,
            submitted_at: self.submitted_at,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The full new state of an updated project plus its child-row diff.
///
/// The project row and the technology rows must be written in one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectChanges {
    pub project_id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub repository_url: Option<String>,
    pub status: ProjectStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub added_technologies: Vec<TechnologyId>,
    pub removed_technologies: Vec<TechnologyId>,
}

impl ProjectChanges {
    pub fn apply_to(&self, project: &mut Project, now: DateTime<Utc>) {
        project.name = self.name.clone();
        project.description = self.description.clone();
        project.repository_url = self.repository_url.clone();
        project.status = self.status;
        project.submitted_at = self.submitted_at;
        project
            .technologies
            .retain(|t| !self.removed_technologies.contains(t));
        for t in &self.added_technologies {
            if !project.technologies.contains(t) {
                project.technologies.push(*t);
            }
        }
        project.technologies.sort();
        project.updated_at = now;
    }
}

pub(crate) fn normalize_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("project name cannot be empty"));
    }
    if name.chars().count() > 200 {
        return Err(DomainError::validation("project name is too long"));
    }
    Ok(name.to_string())
}

pub(crate) fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(crate) fn ensure_team_settable(status: ProjectStatus) -> DomainResult<()> {
    if status.is_team_settable() {
        Ok(())
    } else {
        Err(DomainError::invalid_status(status.to_string()))
    }
}

pub(crate) fn dedup_technologies(ids: &[TechnologyId]) -> Vec<TechnologyId> {
    ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults_to_draft() {
        let req: CreateProject =
            serde_json::from_str(r#"{"team_id":3,"event_id":1,"name":"Rover"}"#).unwrap();
        assert_eq!(req.status, ProjectStatus::Draft);
        assert!(req.technology_ids.is_empty());
    }

    #[test]
    fn create_request_requires_name() {
        let res: Result<CreateProject, _> = serde_json::from_str(r#"{"team_id":3,"event_id":1}"#);
        assert!(res.is_err());
    }

    #[test]
    fn update_request_has_no_required_fields() {
        let req: UpdateProject = serde_json::from_str("{}").unwrap();
        assert_eq!(req, UpdateProject::default());
    }

    #[test]
    fn only_draft_and_submitted_are_team_settable() {
        assert!(ProjectStatus::Draft.is_team_settable());
        assert!(ProjectStatus::Submitted.is_team_settable());
        assert!(!ProjectStatus::Assessed.is_team_settable());
        assert!(!ProjectStatus::Inactive.is_team_settable());
    }

    #[test]
    fn unknown_status_is_invalid_status() {
        assert!(matches!("archived".parse::<ProjectStatus>(), Err(DomainError::InvalidStatus(_))));
    }
}
