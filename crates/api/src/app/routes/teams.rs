use std::sync::Arc;

use axum::extract::Extension;

use hackathon_core::{InvitationId, JoinRequestId, Page, TeamId};
use hackathon_teams::{CreateTeam, Team, TeamInvitation, TeamRequest};

use crate::app::dto::{InviteParticipant, RespondProposal, TeamDetail, TeamListParams};
use crate::app::errors::{ApiResponse, ApiResult};
use crate::app::extract::{JsonBody, PathId, QueryParams};
use crate::app::services::AppServices;
use crate::context::RequestContext;

pub async fn list_teams(
    Extension(services): Extension<Arc<AppServices>>,
    QueryParams(params): QueryParams<TeamListParams>,
) -> ApiResult<Page<Team>> {
    let pagination = params.pagination(services.default_page_limit);
    let page = services.teams.list(params.event_id, pagination).await?;
    Ok(ApiResponse::ok("teams", page))
}

pub async fn get_team(
    Extension(services): Extension<Arc<AppServices>>,
    PathId(id): PathId<TeamId>,
) -> ApiResult<TeamDetail> {
    let (team, members) = services.teams.get(id).await?;
    Ok(ApiResponse::ok("team", TeamDetail { team, members }))
}

pub async fn create_team(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: RequestContext,
    JsonBody(body): JsonBody<CreateTeam>,
) -> ApiResult<Team> {
    let team = services.teams.create(ctx.identity(), body).await?;
    Ok(ApiResponse::created("team created", team))
}

pub async fn invite(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: RequestContext,
    PathId(id): PathId<TeamId>,
    JsonBody(body): JsonBody<InviteParticipant>,
) -> ApiResult<TeamInvitation> {
    let invitation = services
        .teams
        .invite(ctx.identity(), id, body.participant_id)
        .await?;
    Ok(ApiResponse::created("invitation sent", invitation))
}

pub async fn respond_invitation(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: RequestContext,
    PathId(id): PathId<InvitationId>,
    JsonBody(body): JsonBody<RespondProposal>,
) -> ApiResult<TeamInvitation> {
    let invitation = services
        .teams
        .respond_invitation(ctx.identity(), id, body.decision)
        .await?;
    Ok(ApiResponse::ok("invitation answered", invitation))
}

pub async fn request_join(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: RequestContext,
    PathId(id): PathId<TeamId>,
) -> ApiResult<TeamRequest> {
    let request = services.teams.request_join(ctx.identity(), id).await?;
    Ok(ApiResponse::created("join request sent", request))
}

pub async fn respond_request(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: RequestContext,
    PathId(id): PathId<JoinRequestId>,
    JsonBody(body): JsonBody<RespondProposal>,
) -> ApiResult<TeamRequest> {
    let request = services
        .teams
        .respond_request(ctx.identity(), id, body.decision)
        .await?;
    Ok(ApiResponse::ok("join request answered", request))
}
