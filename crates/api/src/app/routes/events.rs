use std::sync::Arc;

use axum::extract::Extension;

use hackathon_core::{EventId, Page};
use hackathon_events::{CreateEvent, Event, EventStatusTransition, StaffAssignment, StaffKind};

use crate::app::dto::{AssignStaff, PageParams};
use crate::app::errors::{ApiResponse, ApiResult};
use crate::app::extract::{JsonBody, PathId, QueryParams};
use crate::app::services::AppServices;

pub async fn list_events(
    Extension(services): Extension<Arc<AppServices>>,
    QueryParams(params): QueryParams<PageParams>,
) -> ApiResult<Page<Event>> {
    let pagination = params.pagination(services.default_page_limit);
    let page = services.events.list(pagination).await?;
    Ok(ApiResponse::ok("events", page))
}

pub async fn latest_event(Extension(services): Extension<Arc<AppServices>>) -> ApiResult<Event> {
    let event = services.events.latest().await?;
    Ok(ApiResponse::ok("latest event", event))
}

pub async fn get_event(
    Extension(services): Extension<Arc<AppServices>>,
    PathId(id): PathId<EventId>,
) -> ApiResult<Event> {
    let event = services.events.get(id).await?;
    Ok(ApiResponse::ok("event", event))
}

pub async fn create_event(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<CreateEvent>,
) -> ApiResult<Event> {
    let event = services.events.create(body).await?;
    Ok(ApiResponse::created("event created", event))
}

pub async fn change_status(
    Extension(services): Extension<Arc<AppServices>>,
    PathId(id): PathId<EventId>,
    JsonBody(body): JsonBody<EventStatusTransition>,
) -> ApiResult<Event> {
    let event = services.events.transition(id, body).await?;
    Ok(ApiResponse::ok("event status updated", event))
}

pub async fn assign_judge(
    Extension(services): Extension<Arc<AppServices>>,
    PathId(id): PathId<EventId>,
    JsonBody(body): JsonBody<AssignStaff>,
) -> ApiResult<StaffAssignment> {
    let assignment = services.events.assign_staff(id, body.user_id, StaffKind::Judge).await?;
    Ok(ApiResponse::created("judge assigned", assignment))
}

pub async fn assign_mentor(
    Extension(services): Extension<Arc<AppServices>>,
    PathId(id): PathId<EventId>,
    JsonBody(body): JsonBody<AssignStaff>,
) -> ApiResult<StaffAssignment> {
    let assignment = services.events.assign_staff(id, body.user_id, StaffKind::Mentor).await?;
    Ok(ApiResponse::created("mentor assigned", assignment))
}
