use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, Row};
use tracing::{Span, instrument};

use hackathon_core::{DomainError, DomainResult, EventId, ProjectId, TeamId, TechnologyId};
use hackathon_projects::{
    NewAssessment, NewProject, Project, ProjectAssessment, ProjectChanges, ProjectQuery,
    ensure_deactivatable,
};

use super::rows::{ASSESSMENT_COLUMNS, PROJECT_COLUMNS, ProjectRow, assessment_from_row};
use super::{PgStore, count_from_row, ids, limit_param, map_sqlx_error, offset_param};
use crate::store::{AssessmentStore, ProjectStore};

const PROJECT_FILTER: &str = r#"
    WHERE ($1::bigint IS NULL OR event_id = $1)
      AND ($2::bigint IS NULL OR team_id = $2)
      AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%' ESCAPE '\')
      AND ($4::text IS NULL OR status = $4)
      AND ($5::date IS NULL OR (created_at AT TIME ZONE 'UTC')::date = $5)
"#;

fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

async fn technologies_for(
    conn: &mut PgConnection,
    project_ids: &[i64],
) -> DomainResult<HashMap<i64, Vec<TechnologyId>>> {
    let rows = sqlx::query(
        "SELECT project_id, technology_id FROM project_technologies \
         WHERE project_id = ANY($1) ORDER BY technology_id",
    )
    .bind(project_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("load_technologies", e))?;

    let mut by_project: HashMap<i64, Vec<TechnologyId>> = HashMap::new();
    for row in rows {
        let project_id: i64 = row
            .try_get("project_id")
            .map_err(|e| map_sqlx_error("load_technologies", e))?;
        let technology_id: i64 = row
            .try_get("technology_id")
            .map_err(|e| map_sqlx_error("load_technologies", e))?;
        by_project
            .entry(project_id)
            .or_default()
            .push(TechnologyId::new(technology_id));
    }
    Ok(by_project)
}

/// Attach technology rows to project rows, preserving row order.
async fn hydrate(conn: &mut PgConnection, rows: Vec<PgRow>) -> DomainResult<Vec<Project>> {
    let rows = rows
        .iter()
        .map(ProjectRow::from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| map_sqlx_error("decode_project", e))?;
    let project_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut technologies = technologies_for(conn, &project_ids).await?;

    rows.into_iter()
        .map(|row| {
            let techs = technologies.remove(&row.id).unwrap_or_default();
            row.into_project(techs)
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| map_sqlx_error("decode_project", e))
}

async fn hydrate_one(conn: &mut PgConnection, row: PgRow) -> DomainResult<Project> {
    hydrate(conn, vec![row])
        .await?
        .pop()
        .ok_or(DomainError::not_found("project"))
}

async fn project_exists(conn: &mut PgConnection, id: ProjectId) -> DomainResult<bool> {
    let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM projects WHERE id = $1) AS found")
        .bind(id.get())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("project_exists", e))?;
    row.try_get("found")
        .map_err(|e| map_sqlx_error("project_exists", e))
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn find_project(&self, id: ProjectId) -> DomainResult<Option<Project>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("acquire", e))?;
        let row = sqlx::query(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("find_project", e))?;
        match row {
            Some(row) => hydrate_one(&mut conn, row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_team_project(&self, team_id: TeamId, event_id: EventId) -> DomainResult<Option<Project>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("acquire", e))?;
        let row = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE team_id = $1 AND event_id = $2"
        ))
        .bind(team_id.get())
        .bind(event_id.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("find_team_project", e))?;
        match row {
            Some(row) => hydrate_one(&mut conn, row).await.map(Some),
            None => Ok(None),
        }
    }

    #[instrument(
        skip(self, query),
        fields(sort = query.sort.column(), page = query.pagination.page, total = tracing::field::Empty),
        err
    )]
    async fn list_projects(&self, query: &ProjectQuery) -> DomainResult<(Vec<Project>, u64)> {
        let filter = &query.filter;
        let event_param = filter.event_id.map(|e| e.get());
        let team_param = filter.team_id.map(|t| t.get());
        let search_param = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(escape_like);
        let status_param = filter.status.map(|s| s.as_str());

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("acquire", e))?;

        let count = sqlx::query(&format!("SELECT COUNT(*) AS total FROM projects {PROJECT_FILTER}"))
            .bind(event_param)
            .bind(team_param)
            .bind(search_param.as_deref())
            .bind(status_param)
            .bind(filter.created_date)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("count_projects", e))?;
        let total = count_from_row(&count)?;

        let direction = query.pagination.direction.as_sql();
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects {PROJECT_FILTER} \
             ORDER BY {} {direction}, id {direction} LIMIT $6 OFFSET $7",
            query.sort.order_expr()
        );
        let rows = sqlx::query(&sql)
            .bind(event_param)
            .bind(team_param)
            .bind(search_param.as_deref())
            .bind(status_param)
            .bind(filter.created_date)
            .bind(limit_param(&query.pagination))
            .bind(offset_param(&query.pagination))
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("list_projects", e))?;

        Span::current().record("total", total);
        let projects = hydrate(&mut conn, rows).await?;
        Ok((projects, total))
    }

    #[instrument(skip(self, project), fields(team_id = %project.team_id, event_id = %project.event_id), err)]
    async fn create_project(&self, project: NewProject) -> DomainResult<Project> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query(&format!(
            "INSERT INTO projects (team_id, event_id, name, description, repository_url, status, submitted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(project.team_id.get())
        .bind(project.event_id.get())
        .bind(&project.name)
        .bind(project.description.as_deref())
        .bind(project.repository_url.as_deref())
        .bind(project.status.as_str())
        .bind(project.submitted_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_project", e))?;
        let project_id: i64 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("insert_project", e))?;

        if !project.technologies.is_empty() {
            sqlx::query(
                "INSERT INTO project_technologies (project_id, technology_id) \
                 SELECT $1, UNNEST($2::bigint[])",
            )
            .bind(project_id)
            .bind(ids(&project.technologies, TechnologyId::get))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_project_technologies", e))?;
        }

        let created = hydrate_one(&mut tx, row).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(created)
    }

    #[instrument(skip(self, changes), fields(project_id = %changes.project_id), err)]
    async fn apply_project_changes(&self, changes: &ProjectChanges) -> DomainResult<Project> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query(&format!(
            "UPDATE projects SET name = $2, description = $3, repository_url = $4, status = $5, \
             submitted_at = $6, updated_at = NOW() \
             WHERE id = $1 AND status = 'draft' RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(changes.project_id.get())
        .bind(&changes.name)
        .bind(changes.description.as_deref())
        .bind(changes.repository_url.as_deref())
        .bind(changes.status.as_str())
        .bind(changes.submitted_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_project", e))?;

        let Some(row) = row else {
            return Err(if project_exists(&mut tx, changes.project_id).await? {
                DomainError::ProjectStatusShouldBeDraft
            } else {
                DomainError::not_found("project")
            });
        };

        if !changes.removed_technologies.is_empty() {
            sqlx::query(
                "DELETE FROM project_technologies WHERE project_id = $1 AND technology_id = ANY($2)",
            )
            .bind(changes.project_id.get())
            .bind(ids(&changes.removed_technologies, TechnologyId::get))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("remove_project_technologies", e))?;
        }
        if !changes.added_technologies.is_empty() {
            sqlx::query(
                "INSERT INTO project_technologies (project_id, technology_id) \
                 SELECT $1, UNNEST($2::bigint[]) ON CONFLICT DO NOTHING",
            )
            .bind(changes.project_id.get())
            .bind(ids(&changes.added_technologies, TechnologyId::get))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("add_project_technologies", e))?;
        }

        let updated = hydrate_one(&mut tx, row).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(updated)
    }

    #[instrument(skip(self), fields(project_id = %id), err)]
    async fn deactivate_project(&self, id: ProjectId) -> DomainResult<Project> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("acquire", e))?;
        let row = sqlx::query(&format!(
            "UPDATE projects SET status = 'inactive', updated_at = NOW() \
             WHERE id = $1 AND status IN ('draft', 'submitted') RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("deactivate_project", e))?;
        if let Some(row) = row {
            return hydrate_one(&mut conn, row).await;
        }

        let current = sqlx::query("SELECT status FROM projects WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("project_status", e))?;
        let Some(current) = current else {
            return Err(DomainError::not_found("project"));
        };
        let status: String = current
            .try_get("status")
            .map_err(|e| map_sqlx_error("project_status", e))?;
        ensure_deactivatable(status.parse()?)?;
        Err(DomainError::internal(format!(
            "project {id} was deactivatable but the update matched no row"
        )))
    }
}

#[async_trait]
impl AssessmentStore for PgStore {
    async fn list_assessments(&self, project_id: ProjectId) -> DomainResult<Vec<ProjectAssessment>> {
        let rows = sqlx::query(&format!(
            "SELECT {ASSESSMENT_COLUMNS} FROM project_assessments WHERE project_id = $1 ORDER BY judge_id, id"
        ))
        .bind(project_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_assessments", e))?;
        rows.iter()
            .map(assessment_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_assessments", e))
    }

    #[instrument(skip(self, batch), fields(project_id = %project_id, batch_size = batch.len()), err)]
    async fn submit_assessments(
        &self,
        project_id: ProjectId,
        batch: Vec<NewAssessment>,
    ) -> DomainResult<Vec<ProjectAssessment>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        // Claim the submitted -> assessed transition first; concurrent batches
        // block on the row lock and then see zero rows.
        let claimed = sqlx::query(
            "UPDATE projects SET status = 'assessed', updated_at = NOW() \
             WHERE id = $1 AND status = 'submitted'",
        )
        .bind(project_id.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("claim_assessment", e))?;
        if claimed.rows_affected() == 0 {
            return Err(if project_exists(&mut tx, project_id).await? {
                DomainError::ProjectStatusShouldBeSubmitted
            } else {
                DomainError::not_found("project")
            });
        }

        let mut inserted = Vec::with_capacity(batch.len());
        for a in &batch {
            let row = sqlx::query(&format!(
                "INSERT INTO project_assessments (project_id, judge_id, criterion_id, score) \
                 VALUES ($1, $2, $3, $4) RETURNING {ASSESSMENT_COLUMNS}"
            ))
            .bind(project_id.get())
            .bind(a.judge_id.get())
            .bind(a.criterion_id.get())
            .bind(a.score)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_assessment", e))?;
            inserted.push(assessment_from_row(&row).map_err(|e| map_sqlx_error("insert_assessment", e))?);
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("rover"), "rover");
    }
}
