use std::sync::Arc;

use axum::extract::Extension;

use hackathon_events::Region;
use hackathon_projects::{CreateCriterion, Criterion, Technology};

use crate::app::errors::{ApiResponse, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::services::AppServices;

pub async fn list_regions(Extension(services): Extension<Arc<AppServices>>) -> ApiResult<Vec<Region>> {
    let regions = services.reference.regions().await?;
    Ok(ApiResponse::ok("regions", regions))
}

pub async fn list_technologies(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Vec<Technology>> {
    let technologies = services.reference.technologies().await?;
    Ok(ApiResponse::ok("technologies", technologies))
}

pub async fn list_criteria(Extension(services): Extension<Arc<AppServices>>) -> ApiResult<Vec<Criterion>> {
    let criteria = services.reference.criteria().await?;
    Ok(ApiResponse::ok("criteria", criteria))
}

pub async fn create_criterion(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<CreateCriterion>,
) -> ApiResult<Criterion> {
    let criterion = services.reference.create_criterion(body).await?;
    Ok(ApiResponse::created("criterion created", criterion))
}
