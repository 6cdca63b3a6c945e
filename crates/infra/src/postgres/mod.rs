//! Postgres backend.
//!
//! Every unit of work runs inside one `Transaction`. A transaction that is
//! dropped before `commit` (early `?` return, or the request future being
//! cancelled) is rolled back by sqlx.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | DomainError |
//! |------------|----------------------|-------------|
//! | Database (unique violation on `projects_team_event_key`) | `23505` | `TeamAlreadyHasProject` |
//! | Database (any other unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Internal` |
//! | Row decode / pool / network | N/A | `Internal` |

mod projects;
mod rows;
mod teams;

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use hackathon_auth::{Identity, ParticipantProfile, UserLookup};
use hackathon_core::{
    CriterionId, DomainError, DomainResult, EventId, Pagination, ParticipantId, TechnologyId, UserId,
};
use hackathon_events::{CreateEvent, Event, EventStatus, Region, StaffAssignment, StaffKind};
use hackathon_projects::{Criterion, Technology};

use crate::store::{EventStore, ReferenceStore, UserStore};
use rows::{EVENT_COLUMNS, EventRow, IDENTITY_SELECT, IdentityRow};

const MIGRATION: &str = include_str!("../../migrations/0001_init.sql");

const PROJECT_TEAM_EVENT_KEY: &str = "projects_team_event_key";

/// sqlx-backed store implementing every persistence trait.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> DomainResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the schema. Safe to run on every start.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> DomainResult<()> {
        sqlx::raw_sql(MIGRATION)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") if db_err.constraint() == Some(PROJECT_TEAM_EVENT_KEY) => {
                    DomainError::TeamAlreadyHasProject
                }
                Some("23505") => DomainError::Conflict(msg),
                _ => DomainError::Internal(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            DomainError::Internal(format!("connection pool closed in {}", operation))
        }
        _ => DomainError::Internal(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// `LIMIT` parameter; `NULL` means no limit.
pub(crate) fn limit_param(pagination: &Pagination) -> Option<i64> {
    (!pagination.is_unlimited()).then(|| i64::from(pagination.limit))
}

pub(crate) fn offset_param(pagination: &Pagination) -> i64 {
    i64::try_from(pagination.offset()).unwrap_or(i64::MAX)
}

pub(crate) fn count_from_row(row: &sqlx::postgres::PgRow) -> DomainResult<u64> {
    let total: i64 = row
        .try_get("total")
        .map_err(|e| map_sqlx_error("read_count", e))?;
    Ok(total.max(0) as u64)
}

fn ids<T: Copy>(items: &[T], get: impl Fn(T) -> i64) -> Vec<i64> {
    items.iter().map(|i| get(*i)).collect()
}

#[async_trait]
impl UserLookup for PgStore {
    #[instrument(skip(self), err)]
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Identity>> {
        let row = sqlx::query(&format!("{IDENTITY_SELECT} WHERE u.email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_email", e))?;
        row.map(|r| IdentityRow::from_row(&r).and_then(Identity::try_from))
            .transpose()
            .map_err(|e| map_sqlx_error("find_by_email", e))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: UserId) -> DomainResult<Option<Identity>> {
        let row = sqlx::query(&format!("{IDENTITY_SELECT} WHERE u.id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user", e))?;
        row.map(|r| IdentityRow::from_row(&r).and_then(Identity::try_from))
            .transpose()
            .map_err(|e| map_sqlx_error("find_user", e))
    }

    async fn find_participant(&self, id: ParticipantId) -> DomainResult<Option<ParticipantProfile>> {
        let row = sqlx::query("SELECT id, name FROM participants WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_participant", e))?;
        row.map(|r| {
            Ok::<_, sqlx::Error>(ParticipantProfile {
                id: ParticipantId::new(r.try_get("id")?),
                name: r.try_get("name")?,
            })
        })
        .transpose()
        .map_err(|e| map_sqlx_error("find_participant", e))
    }
}

fn event_from_row(row: &sqlx::postgres::PgRow) -> Result<Event, sqlx::Error> {
    EventRow::from_row(row).and_then(Event::try_from)
}

#[async_trait]
impl EventStore for PgStore {
    #[instrument(skip(self), err)]
    async fn list_events(&self, pagination: &Pagination) -> DomainResult<(Vec<Event>, u64)> {
        let count = sqlx::query("SELECT COUNT(*) AS total FROM events")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_events", e))?;
        let total = count_from_row(&count)?;

        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY id {} LIMIT $1 OFFSET $2",
            pagination.direction.as_sql()
        );
        let rows = sqlx::query(&sql)
            .bind(limit_param(pagination))
            .bind(offset_param(pagination))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_events", e))?;

        let events = rows
            .iter()
            .map(event_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_events", e))?;
        Ok((events, total))
    }

    async fn find_event(&self, id: EventId) -> DomainResult<Option<Event>> {
        let row = sqlx::query(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_event", e))?;
        row.as_ref()
            .map(event_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_event", e))
    }

    async fn latest_event(&self) -> DomainResult<Option<Event>> {
        let row = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE status NOT IN ('inactive', 'rejected') \
             ORDER BY start_date DESC, id DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("latest_event", e))?;
        row.as_ref()
            .map(event_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("latest_event", e))
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create_event(&self, request: &CreateEvent) -> DomainResult<Event> {
        let row = sqlx::query(&format!(
            "INSERT INTO events (name, description, region_id, start_date, end_date, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {EVENT_COLUMNS}"
        ))
        .bind(request.name.trim())
        .bind(request.description.as_deref())
        .bind(request.region_id.map(|r| r.get()))
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(EventStatus::Created.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_event", e))?;
        event_from_row(&row).map_err(|e| map_sqlx_error("create_event", e))
    }

    #[instrument(skip(self), fields(event_id = %id, status = %status), err)]
    async fn set_event_status(&self, id: EventId, status: EventStatus) -> DomainResult<Event> {
        let row = sqlx::query(&format!(
            "UPDATE events SET status = $2 WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id.get())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("set_event_status", e))?;
        match row {
            Some(row) => event_from_row(&row).map_err(|e| map_sqlx_error("set_event_status", e)),
            None => Err(DomainError::not_found("event")),
        }
    }

    #[instrument(skip(self), err)]
    async fn add_staff(&self, assignment: StaffAssignment) -> DomainResult<()> {
        sqlx::query("INSERT INTO event_staff (event_id, user_id, kind) VALUES ($1, $2, $3)")
            .bind(assignment.event_id.get())
            .bind(assignment.user_id.get())
            .bind(assignment.kind.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("add_staff", e))?;
        Ok(())
    }

    async fn is_staff(&self, event_id: EventId, user_id: UserId, kind: StaffKind) -> DomainResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM event_staff WHERE event_id = $1 AND user_id = $2 AND kind = $3) AS found",
        )
        .bind(event_id.get())
        .bind(user_id.get())
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("is_staff", e))?;
        row.try_get("found").map_err(|e| map_sqlx_error("is_staff", e))
    }
}

#[async_trait]
impl ReferenceStore for PgStore {
    async fn list_regions(&self) -> DomainResult<Vec<Region>> {
        let rows = sqlx::query("SELECT id, name FROM regions ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_regions", e))?;
        rows.iter()
            .map(rows::region_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_regions", e))
    }

    async fn list_technologies(&self) -> DomainResult<Vec<Technology>> {
        let rows = sqlx::query("SELECT id, name FROM technologies ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_technologies", e))?;
        rows.iter()
            .map(rows::technology_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_technologies", e))
    }

    async fn known_technologies(&self, wanted: &[TechnologyId]) -> DomainResult<HashSet<TechnologyId>> {
        let rows = sqlx::query("SELECT id FROM technologies WHERE id = ANY($1)")
            .bind(ids(wanted, TechnologyId::get))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("known_technologies", e))?;
        rows.iter()
            .map(|r| r.try_get::<i64, _>("id").map(TechnologyId::new))
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("known_technologies", e))
    }

    async fn list_criteria(&self) -> DomainResult<Vec<Criterion>> {
        let rows = sqlx::query("SELECT id, name FROM criteria ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_criteria", e))?;
        rows.iter()
            .map(rows::criterion_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_criteria", e))
    }

    async fn criterion_ids(&self) -> DomainResult<HashSet<CriterionId>> {
        let rows = sqlx::query("SELECT id FROM criteria")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("criterion_ids", e))?;
        rows.iter()
            .map(|r| r.try_get::<i64, _>("id").map(CriterionId::new))
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("criterion_ids", e))
    }

    #[instrument(skip(self), err)]
    async fn create_criterion(&self, name: &str) -> DomainResult<Criterion> {
        let row = sqlx::query("INSERT INTO criteria (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_criterion", e))?;
        rows::criterion_from_row(&row).map_err(|e| map_sqlx_error("create_criterion", e))
    }
}
