//! Project list filtering and sorting.
//!
//! The SQL store translates these into `WHERE`/`ORDER BY`; the in-memory store
//! calls [`ProjectFilter::matches`] and [`ProjectSort::compare`] directly, so
//! both produce the same pages.

use core::cmp::Ordering;
use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use hackathon_core::{DomainError, EventId, Pagination, SortDirection, TeamId};

use crate::{Project, ProjectStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFilter {
    pub event_id: Option<EventId>,
    pub team_id: Option<TeamId>,
    /// Case-insensitive substring of the project name.
    pub search: Option<String>,
    pub status: Option<ProjectStatus>,
    /// Exact creation day (UTC).
    pub created_date: Option<NaiveDate>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        if self.event_id.is_some_and(|id| id != project.event_id) {
            return false;
        }
        if self.team_id.is_some_and(|id| id != project.team_id) {
            return false;
        }
        if self.status.is_some_and(|s| s != project.status) {
            return false;
        }
        if self
            .created_date
            .is_some_and(|d| d != project.created_at.date_naive())
        {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => project
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectSort {
    #[default]
    Id,
    Name,
    CreatedAt,
    Status,
}

impl ProjectSort {
    pub fn column(self) -> &'static str {
        match self {
            ProjectSort::Id => "id",
            ProjectSort::Name => "name",
            ProjectSort::CreatedAt => "created_at",
            ProjectSort::Status => "status",
        }
    }

    /// SQL sort key. Text columns compare bytewise, matching [`ProjectSort::compare`].
    pub fn order_expr(self) -> &'static str {
        match self {
            ProjectSort::Id => "id",
            ProjectSort::Name => r#"name COLLATE "C""#,
            ProjectSort::CreatedAt => "created_at",
            ProjectSort::Status => r#"status COLLATE "C""#,
        }
    }

    /// Ordering of two projects for this field; ties fall back to id.
    pub fn compare(self, a: &Project, b: &Project, direction: SortDirection) -> Ordering {
        let primary = match self {
            ProjectSort::Id => a.id.cmp(&b.id),
            ProjectSort::Name => a.name.cmp(&b.name),
            ProjectSort::CreatedAt => a.created_at.cmp(&b.created_at),
            ProjectSort::Status => a.status.as_str().cmp(b.status.as_str()),
        };
        let ord = primary.then_with(|| a.id.cmp(&b.id));
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

impl FromStr for ProjectSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(ProjectSort::Id),
            "name" => Ok(ProjectSort::Name),
            "created_at" => Ok(ProjectSort::CreatedAt),
            "status" => Ok(ProjectSort::Status),
            other => Err(DomainError::validation(format!("unknown sort field: {other}"))),
        }
    }
}

/// Everything a project listing needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectQuery {
    pub filter: ProjectFilter,
    pub sort: ProjectSort,
    pub pagination: Pagination,
}

impl ProjectQuery {
    /// Filter, sort and slice an in-memory collection. Returns the page and
    /// the total number of matching rows.
    pub fn run(&self, projects: impl IntoIterator<Item = Project>) -> (Vec<Project>, u64) {
        let mut matched: Vec<Project> = projects
            .into_iter()
            .filter(|p| self.filter.matches(p))
            .collect();
        matched.sort_by(|a, b| self.sort.compare(a, b, self.pagination.direction));
        let total = matched.len() as u64;
        (self.pagination.apply(matched), total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::tests::{now, project};
    use chrono::Duration;
    use hackathon_core::{ProjectId, total_page};

    fn named(id: i64, name: &str, status: ProjectStatus) -> Project {
        let mut p = project(status);
        p.id = ProjectId::new(id);
        p.name = name.to_string();
        p.created_at = now() + Duration::days(id);
        p
    }

    fn catalogue() -> Vec<Project> {
        vec![
            named(1, "Solar Rover", ProjectStatus::Draft),
            named(2, "rover-ui", ProjectStatus::Submitted),
            named(3, "Weather bot", ProjectStatus::Submitted),
            named(4, "ROVER ops", ProjectStatus::Assessed),
        ]
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let filter = ProjectFilter {
            search: Some("rOvEr".to_string()),
            ..ProjectFilter::default()
        };
        let ids: Vec<_> = catalogue()
            .iter()
            .filter(|p| filter.matches(p))
            .map(|p| p.id.get())
            .collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn status_and_created_date_narrow_results() {
        let filter = ProjectFilter {
            status: Some(ProjectStatus::Submitted),
            created_date: Some((now() + Duration::days(3)).date_naive()),
            ..ProjectFilter::default()
        };
        let hits: Vec<_> = catalogue().into_iter().filter(|p| filter.matches(p)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, ProjectId::new(3));
    }

    #[test]
    fn query_sorts_descending_and_pages() {
        let query = ProjectQuery {
            filter: ProjectFilter::default(),
            sort: ProjectSort::Name,
            pagination: Pagination::new(Some(1), Some(3), 10).with_direction(SortDirection::Desc),
        };
        let (page, total) = query.run(catalogue());
        assert_eq!(total, 4);
        assert_eq!(total_page(total, query.pagination.limit), 2);
        let names: Vec<_> = page.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["rover-ui", "Weather bot", "Solar Rover"]);
    }

    #[test]
    fn name_sort_is_bytewise_like_the_sql_collation() {
        let query = ProjectQuery { sort: ProjectSort::Name, ..ProjectQuery::default() };
        let (page, _) = query.run(catalogue());
        let names: Vec<_> = page.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["ROVER ops", "Solar Rover", "Weather bot", "rover-ui"]);
        assert_eq!(ProjectSort::Name.order_expr(), r#"name COLLATE "C""#);
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        assert_eq!("created_at".parse::<ProjectSort>(), Ok(ProjectSort::CreatedAt));
        assert!(matches!("owner".parse::<ProjectSort>(), Err(DomainError::Validation(_))));
    }
}
