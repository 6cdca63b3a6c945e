use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::app::dto::MeResponse;
use crate::app::errors::{ApiResponse, json_error};
use crate::context::RequestContext;

pub async fn home() -> impl IntoResponse {
    ApiResponse::ok(
        "welcome",
        json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn me(ctx: RequestContext) -> impl IntoResponse {
    ApiResponse::ok(
        "current user",
        MeResponse {
            identity: ctx.identity().clone(),
        },
    )
}

/// Fallback for paths no router claims, with or without a token.
pub async fn not_found(uri: Uri) -> Response {
    json_error(StatusCode::NOT_FOUND, "route not found", uri.path().to_string())
}
