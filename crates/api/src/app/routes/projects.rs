use std::sync::Arc;

use axum::extract::Extension;

use hackathon_core::{Page, ProjectId};
use hackathon_projects::{CreateProject, JudgeAssessments, Project, ProjectAssessment, UpdateProject};

use crate::app::dto::{ProjectDetail, ProjectListParams, ProjectStatusChange, SubmitAssessments};
use crate::app::errors::{ApiResponse, ApiResult};
use crate::app::extract::{JsonBody, PathId, QueryParams};
use crate::app::services::AppServices;
use crate::context::RequestContext;

pub async fn list_projects(
    Extension(services): Extension<Arc<AppServices>>,
    QueryParams(params): QueryParams<ProjectListParams>,
) -> ApiResult<Page<Project>> {
    let query = params.into_query(services.default_page_limit);
    let page = services.projects.list(query).await?;
    Ok(ApiResponse::ok("projects", page))
}

pub async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: RequestContext,
    PathId(id): PathId<ProjectId>,
) -> ApiResult<ProjectDetail> {
    let (project, team) = services.projects.get(ctx.identity(), id).await?;
    Ok(ApiResponse::ok("project", ProjectDetail { project, team }))
}

pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: RequestContext,
    JsonBody(body): JsonBody<CreateProject>,
) -> ApiResult<Project> {
    let project = services.projects.create(ctx.identity(), body).await?;
    Ok(ApiResponse::created("project created", project))
}

pub async fn update_project(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: RequestContext,
    PathId(id): PathId<ProjectId>,
    JsonBody(body): JsonBody<UpdateProject>,
) -> ApiResult<Project> {
    let project = services.projects.update(ctx.identity(), id, body).await?;
    Ok(ApiResponse::ok("project updated", project))
}

pub async fn change_status(
    Extension(services): Extension<Arc<AppServices>>,
    PathId(id): PathId<ProjectId>,
    JsonBody(body): JsonBody<ProjectStatusChange>,
) -> ApiResult<Project> {
    let project = services.projects.set_status(id, &body.status).await?;
    Ok(ApiResponse::ok("project status updated", project))
}

pub async fn list_assessments(
    Extension(services): Extension<Arc<AppServices>>,
    PathId(id): PathId<ProjectId>,
) -> ApiResult<Vec<JudgeAssessments>> {
    let grouped = services.assessments.list(id).await?;
    Ok(ApiResponse::ok("assessments", grouped))
}

pub async fn submit_assessments(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: RequestContext,
    PathId(id): PathId<ProjectId>,
    JsonBody(body): JsonBody<SubmitAssessments>,
) -> ApiResult<Vec<ProjectAssessment>> {
    let saved = services
        .assessments
        .submit(ctx.identity(), id, body.assessments)
        .await?;
    Ok(ApiResponse::created("project assessed", saved))
}
