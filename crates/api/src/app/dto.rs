use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use hackathon_auth::Identity;
use hackathon_core::{EventId, Pagination, ParticipantId, SortDirection, TeamId, UserId};
use hackathon_projects::{
    AssessmentInput, Project, ProjectFilter, ProjectQuery, ProjectSort, ProjectStatus,
};
use hackathon_teams::{ProposalDecision, Team, TeamMember};

/// `?page=&limit=&direction=`. A limit of 0 returns everything.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub direction: SortDirection,
}

impl PageParams {
    pub fn pagination(&self, default_limit: u32) -> Pagination {
        Pagination::new(self.page, self.limit, default_limit).with_direction(self.direction)
    }
}

// Paging fields stay inline: `serde(flatten)` loses number parsing for query strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamListParams {
    pub event_id: Option<EventId>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub direction: SortDirection,
}

impl TeamListParams {
    pub fn pagination(&self, default_limit: u32) -> Pagination {
        Pagination::new(self.page, self.limit, default_limit).with_direction(self.direction)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectListParams {
    pub event_id: Option<EventId>,
    pub team_id: Option<TeamId>,
    pub search: Option<String>,
    pub status: Option<ProjectStatus>,
    pub created_date: Option<NaiveDate>,
    #[serde(default)]
    pub sort: ProjectSort,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub direction: SortDirection,
}

impl ProjectListParams {
    pub fn into_query(self, default_limit: u32) -> ProjectQuery {
        ProjectQuery {
            pagination: Pagination::new(self.page, self.limit, default_limit)
                .with_direction(self.direction),
            sort: self.sort,
            filter: ProjectFilter {
                event_id: self.event_id,
                team_id: self.team_id,
                search: self.search.filter(|s| !s.trim().is_empty()),
                status: self.status,
                created_date: self.created_date,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InviteParticipant {
    pub participant_id: ParticipantId,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RespondProposal {
    pub decision: ProposalDecision,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AssignStaff {
    pub user_id: UserId,
}

/// Target status as sent; anything other than `inactive` is rejected downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectStatusChange {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAssessments {
    pub assessments: Vec<AssessmentInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub identity: Identity,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub team: Team,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_params_build_a_query() {
        let params: ProjectListParams = serde_json::from_value(serde_json::json!({
            "event_id": 2,
            "search": "  ",
            "status": "submitted",
            "sort": "created_at",
            "page": 3,
            "limit": 5,
            "direction": "desc",
        }))
        .unwrap();
        let query = params.into_query(10);
        assert_eq!(query.filter.event_id, Some(EventId::new(2)));
        assert_eq!(query.filter.search, None);
        assert_eq!(query.filter.status, Some(ProjectStatus::Submitted));
        assert_eq!(query.sort, ProjectSort::CreatedAt);
        assert_eq!(query.pagination.page, 3);
        assert_eq!(query.pagination.limit, 5);
        assert_eq!(query.pagination.direction, SortDirection::Desc);
    }

    #[test]
    fn missing_limit_uses_the_configured_default() {
        let pagination = PageParams::default().pagination(25);
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.limit, 25);
    }
}
