use async_trait::async_trait;
use sqlx::{PgConnection, Row};
use tracing::instrument;

use hackathon_core::{
    DomainError, DomainResult, EventId, InvitationId, JoinRequestId, Pagination, ParticipantId, TeamId,
};
use hackathon_teams::{NewProposal, NewTeam, ProposalStatus, Team, TeamInvitation, TeamMember, TeamRequest};

use super::rows::{
    PROPOSAL_COLUMNS, TEAM_COLUMNS, invitation_from_row, member_from_row, request_from_row, team_from_row,
};
use super::{PgStore, count_from_row, limit_param, map_sqlx_error, offset_param};
use crate::store::TeamStore;

/// Roster insert; the `(event_id, participant_id)` key rejects a second team.
async fn insert_member(conn: &mut PgConnection, team_id: TeamId, participant: ParticipantId) -> DomainResult<()> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO team_members (team_id, event_id, participant_id)
        SELECT t.id, t.event_id, $2 FROM teams t WHERE t.id = $1
        "#,
    )
    .bind(team_id.get())
    .bind(participant.get())
    .execute(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("insert_member", e))?;
    if inserted.rows_affected() == 0 {
        return Err(DomainError::not_found("team"));
    }
    Ok(())
}

/// Flip a pending proposal row inside `conn`'s transaction.
///
/// `table` is one of the two proposal tables and never user input.
async fn settle_proposal(
    conn: &mut PgConnection,
    table: &'static str,
    entity: &'static str,
    id: i64,
    status: ProposalStatus,
) -> DomainResult<sqlx::postgres::PgRow> {
    let current = sqlx::query(&format!("SELECT status FROM {table} WHERE id = $1 FOR UPDATE"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("lock_proposal", e))?
        .ok_or(DomainError::not_found(entity))?;
    let current: String = current
        .try_get("status")
        .map_err(|e| map_sqlx_error("lock_proposal", e))?;
    if current != ProposalStatus::Pending.as_str() {
        return Err(DomainError::invalid_status(format!("{entity} is already {current}")));
    }

    sqlx::query(&format!(
        "UPDATE {table} SET status = $2 WHERE id = $1 RETURNING {PROPOSAL_COLUMNS}"
    ))
    .bind(id)
    .bind(status.as_str())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("settle_proposal", e))
}

#[async_trait]
impl TeamStore for PgStore {
    async fn find_team(&self, id: TeamId) -> DomainResult<Option<Team>> {
        let row = sqlx::query(&format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_team", e))?;
        row.as_ref()
            .map(team_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_team", e))
    }

    #[instrument(skip(self), err)]
    async fn list_teams(
        &self,
        event_id: Option<EventId>,
        pagination: &Pagination,
    ) -> DomainResult<(Vec<Team>, u64)> {
        let event_param = event_id.map(|e| e.get());
        let count = sqlx::query("SELECT COUNT(*) AS total FROM teams WHERE ($1::bigint IS NULL OR event_id = $1)")
            .bind(event_param)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_teams", e))?;
        let total = count_from_row(&count)?;

        let sql = format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE ($1::bigint IS NULL OR event_id = $1) \
             ORDER BY id {} LIMIT $2 OFFSET $3",
            pagination.direction.as_sql()
        );
        let rows = sqlx::query(&sql)
            .bind(event_param)
            .bind(limit_param(pagination))
            .bind(offset_param(pagination))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_teams", e))?;
        let teams = rows
            .iter()
            .map(team_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_teams", e))?;
        Ok((teams, total))
    }

    async fn team_members(&self, team_id: TeamId) -> DomainResult<Vec<TeamMember>> {
        let rows = sqlx::query(
            "SELECT team_id, participant_id, joined_at FROM team_members WHERE team_id = $1 ORDER BY joined_at",
        )
        .bind(team_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("team_members", e))?;
        rows.iter()
            .map(member_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("team_members", e))
    }

    async fn membership(&self, event_id: EventId, participant: ParticipantId) -> DomainResult<Option<TeamId>> {
        let row = sqlx::query("SELECT team_id FROM team_members WHERE event_id = $1 AND participant_id = $2")
            .bind(event_id.get())
            .bind(participant.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("membership", e))?;
        row.map(|r| r.try_get::<i64, _>("team_id").map(TeamId::new))
            .transpose()
            .map_err(|e| map_sqlx_error("membership", e))
    }

    #[instrument(skip(self, team), fields(event_id = %team.event_id, owner_id = %team.owner_id), err)]
    async fn create_team_with_owner(&self, team: NewTeam) -> DomainResult<Team> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query(&format!(
            "INSERT INTO teams (event_id, owner_id, name) VALUES ($1, $2, $3) RETURNING {TEAM_COLUMNS}"
        ))
        .bind(team.event_id.get())
        .bind(team.owner_id.get())
        .bind(&team.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_team", e))?;
        let created = team_from_row(&row).map_err(|e| map_sqlx_error("insert_team", e))?;

        insert_member(&mut tx, created.id, created.owner_id).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(created)
    }

    async fn find_invitation(&self, id: InvitationId) -> DomainResult<Option<TeamInvitation>> {
        let row = sqlx::query(&format!("SELECT {PROPOSAL_COLUMNS} FROM team_invitations WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_invitation", e))?;
        row.as_ref()
            .map(invitation_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_invitation", e))
    }

    async fn pending_invitation_exists(&self, team_id: TeamId, participant: ParticipantId) -> DomainResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM team_invitations \
             WHERE team_id = $1 AND participant_id = $2 AND status = 'pending') AS found",
        )
        .bind(team_id.get())
        .bind(participant.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("pending_invitation_exists", e))?;
        row.try_get("found")
            .map_err(|e| map_sqlx_error("pending_invitation_exists", e))
    }

    #[instrument(skip(self), err)]
    async fn create_invitation(&self, proposal: NewProposal) -> DomainResult<TeamInvitation> {
        let row = sqlx::query(&format!(
            "INSERT INTO team_invitations (team_id, participant_id) VALUES ($1, $2) RETURNING {PROPOSAL_COLUMNS}"
        ))
        .bind(proposal.team_id.get())
        .bind(proposal.participant_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_invitation", e))?;
        invitation_from_row(&row).map_err(|e| map_sqlx_error("create_invitation", e))
    }

    #[instrument(skip(self), fields(invitation_id = %id), err)]
    async fn accept_invitation(&self, id: InvitationId) -> DomainResult<TeamInvitation> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = settle_proposal(&mut tx, "team_invitations", "team invitation", id.get(), ProposalStatus::Accepted)
            .await?;
        let invitation = invitation_from_row(&row).map_err(|e| map_sqlx_error("accept_invitation", e))?;
        insert_member(&mut tx, invitation.team_id, invitation.participant_id).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(invitation)
    }

    async fn reject_invitation(&self, id: InvitationId) -> DomainResult<TeamInvitation> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        let row = settle_proposal(&mut tx, "team_invitations", "team invitation", id.get(), ProposalStatus::Rejected)
            .await?;
        let invitation = invitation_from_row(&row).map_err(|e| map_sqlx_error("reject_invitation", e))?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(invitation)
    }

    async fn find_request(&self, id: JoinRequestId) -> DomainResult<Option<TeamRequest>> {
        let row = sqlx::query(&format!("SELECT {PROPOSAL_COLUMNS} FROM team_requests WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_request", e))?;
        row.as_ref()
            .map(request_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_request", e))
    }

    async fn pending_request_exists(&self, team_id: TeamId, participant: ParticipantId) -> DomainResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM team_requests \
             WHERE team_id = $1 AND participant_id = $2 AND status = 'pending') AS found",
        )
        .bind(team_id.get())
        .bind(participant.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("pending_request_exists", e))?;
        row.try_get("found")
            .map_err(|e| map_sqlx_error("pending_request_exists", e))
    }

    #[instrument(skip(self), err)]
    async fn create_request(&self, proposal: NewProposal) -> DomainResult<TeamRequest> {
        let row = sqlx::query(&format!(
            "INSERT INTO team_requests (team_id, participant_id) VALUES ($1, $2) RETURNING {PROPOSAL_COLUMNS}"
        ))
        .bind(proposal.team_id.get())
        .bind(proposal.participant_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_request", e))?;
        request_from_row(&row).map_err(|e| map_sqlx_error("create_request", e))
    }

    #[instrument(skip(self), fields(request_id = %id), err)]
    async fn approve_request(&self, id: JoinRequestId) -> DomainResult<TeamRequest> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = settle_proposal(&mut tx, "team_requests", "team request", id.get(), ProposalStatus::Accepted)
            .await?;
        let request = request_from_row(&row).map_err(|e| map_sqlx_error("approve_request", e))?;
        insert_member(&mut tx, request.team_id, request.participant_id).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(request)
    }

    async fn reject_request(&self, id: JoinRequestId) -> DomainResult<TeamRequest> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        let row = settle_proposal(&mut tx, "team_requests", "team request", id.get(), ProposalStatus::Rejected)
            .await?;
        let request = request_from_row(&row).map_err(|e| map_sqlx_error("reject_request", e))?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(request)
    }
}
