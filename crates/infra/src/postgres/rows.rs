//! Row types and their mapping onto domain types.

use core::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;

use hackathon_auth::{Identity, ParticipantProfile, Role};
use hackathon_core::{
    AssessmentId, CriterionId, DomainError, EventId, InvitationId, JoinRequestId, ParticipantId,
    ProjectId, RegionId, TeamId, TechnologyId, UserId,
};
use hackathon_events::{Event, EventStatus, Region};
use hackathon_projects::{Criterion, Project, ProjectAssessment, ProjectStatus, Technology};
use hackathon_teams::{ProposalStatus, Team, TeamInvitation, TeamMember, TeamRequest};

fn parse_column<T>(value: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = DomainError>,
{
    value.parse().map_err(|e: DomainError| sqlx::Error::Decode(Box::new(e)))
}

pub(crate) const IDENTITY_SELECT: &str = r#"
    SELECT u.id, u.email, u.role, p.id AS participant_id, p.name AS participant_name
    FROM users u
    LEFT JOIN participants p ON p.user_id = u.id
"#;

pub(crate) struct IdentityRow {
    id: i64,
    email: String,
    role: String,
    participant_id: Option<i64>,
    participant_name: Option<String>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for IdentityRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(IdentityRow {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            role: row.try_get("role")?,
            participant_id: row.try_get("participant_id")?,
            participant_name: row.try_get("participant_name")?,
        })
    }
}

impl TryFrom<IdentityRow> for Identity {
    type Error = sqlx::Error;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let participant = match (row.participant_id, row.participant_name) {
            (Some(id), Some(name)) => Some(ParticipantProfile {
                id: ParticipantId::new(id),
                name,
            }),
            _ => None,
        };
        Ok(Identity {
            id: UserId::new(row.id),
            email: row.email,
            role: parse_column::<Role>(&row.role)?,
            participant,
        })
    }
}

pub(crate) const EVENT_COLUMNS: &str =
    "id, name, description, region_id, start_date, end_date, status, created_at";

pub(crate) struct EventRow {
    id: i64,
    name: String,
    description: Option<String>,
    region_id: Option<i64>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for EventRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(EventRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            region_id: row.try_get("region_id")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<EventRow> for Event {
    type Error = sqlx::Error;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Event {
            id: EventId::new(row.id),
            name: row.name,
            description: row.description,
            region_id: row.region_id.map(RegionId::new),
            start_date: row.start_date,
            end_date: row.end_date,
            status: parse_column::<EventStatus>(&row.status)?,
            created_at: row.created_at,
        })
    }
}

pub(crate) const TEAM_COLUMNS: &str = "id, event_id, owner_id, name, created_at";

pub(crate) fn team_from_row(row: &PgRow) -> Result<Team, sqlx::Error> {
    Ok(Team {
        id: TeamId::new(row.try_get("id")?),
        event_id: EventId::new(row.try_get("event_id")?),
        owner_id: ParticipantId::new(row.try_get("owner_id")?),
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn member_from_row(row: &PgRow) -> Result<TeamMember, sqlx::Error> {
    Ok(TeamMember {
        team_id: TeamId::new(row.try_get("team_id")?),
        participant_id: ParticipantId::new(row.try_get("participant_id")?),
        joined_at: row.try_get("joined_at")?,
    })
}

pub(crate) const PROPOSAL_COLUMNS: &str = "id, team_id, participant_id, status, created_at";

pub(crate) fn invitation_from_row(row: &PgRow) -> Result<TeamInvitation, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(TeamInvitation {
        id: InvitationId::new(row.try_get("id")?),
        team_id: TeamId::new(row.try_get("team_id")?),
        participant_id: ParticipantId::new(row.try_get("participant_id")?),
        status: parse_column::<ProposalStatus>(&status)?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn request_from_row(row: &PgRow) -> Result<TeamRequest, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(TeamRequest {
        id: JoinRequestId::new(row.try_get("id")?),
        team_id: TeamId::new(row.try_get("team_id")?),
        participant_id: ParticipantId::new(row.try_get("participant_id")?),
        status: parse_column::<ProposalStatus>(&status)?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) const PROJECT_COLUMNS: &str = "id, team_id, event_id, name, description, repository_url, \
     status, submitted_at, created_at, updated_at";

/// A project row before its technology rows are attached.
pub(crate) struct ProjectRow {
    pub(crate) id: i64,
    team_id: i64,
    event_id: i64,
    name: String,
    description: Option<String>,
    repository_url: Option<String>,
    status: String,
    submitted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ProjectRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProjectRow {
            id: row.try_get("id")?,
            team_id: row.try_get("team_id")?,
            event_id: row.try_get("event_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            repository_url: row.try_get("repository_url")?,
            status: row.try_get("status")?,
            submitted_at: row.try_get("submitted_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl ProjectRow {
    pub(crate) fn into_project(self, technologies: Vec<TechnologyId>) -> Result<Project, sqlx::Error> {
        Ok(Project {
            id: ProjectId::new(self.id),
            team_id: TeamId::new(self.team_id),
            event_id: EventId::new(self.event_id),
            name: self.name,
            description: self.description,
            repository_url: self.repository_url,
            status: parse_column::<ProjectStatus>(&self.status)?,
            technologies,
            submitted_at: self.submitted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub(crate) const ASSESSMENT_COLUMNS: &str =
    "id, project_id, judge_id, criterion_id, score, created_at";

pub(crate) fn assessment_from_row(row: &PgRow) -> Result<ProjectAssessment, sqlx::Error> {
    Ok(ProjectAssessment {
        id: AssessmentId::new(row.try_get("id")?),
        project_id: ProjectId::new(row.try_get("project_id")?),
        judge_id: UserId::new(row.try_get("judge_id")?),
        criterion_id: CriterionId::new(row.try_get("criterion_id")?),
        score: row.try_get("score")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn region_from_row(row: &PgRow) -> Result<Region, sqlx::Error> {
    Ok(Region {
        id: RegionId::new(row.try_get("id")?),
        name: row.try_get("name")?,
    })
}

pub(crate) fn technology_from_row(row: &PgRow) -> Result<Technology, sqlx::Error> {
    Ok(Technology {
        id: TechnologyId::new(row.try_get("id")?),
        name: row.try_get("name")?,
    })
}

pub(crate) fn criterion_from_row(row: &PgRow) -> Result<Criterion, sqlx::Error> {
    Ok(Criterion {
        id: CriterionId::new(row.try_get("id")?),
        name: row.try_get("name")?,
    })
}
