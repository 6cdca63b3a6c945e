//! The response envelope and the mapping from domain errors onto it.
//!
//! Success: `{code, message, success: true, data}`.
//! Failure: `{code, message, success: false, error: [..]}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

use hackathon_core::{DomainError, ErrorKind};

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

pub fn json_error(status: StatusCode, message: &'static str, reason: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "code": status.as_u16(),
            "message": message,
            "success": false,
            "error": [reason.into()],
        })),
    )
        .into_response()
}

#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    message: &'static str,
    data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            message,
            data,
        }
    }

    pub fn created(message: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            message,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "code": self.status.as_u16(),
                "message": self.message,
                "success": true,
                "data": self.data,
            })),
        )
            .into_response()
    }
}

/// A domain error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::DataNotFound => StatusCode::NOT_FOUND,
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);
        match (kind, self.0) {
            (ErrorKind::Internal, err) => {
                tracing::error!(error = %err, "request failed");
                json_error(status, "internal server error", "internal server error")
            }
            (_, DomainError::Unauthorized(reason)) => json_error(status, "unauthorized", reason),
            (ErrorKind::Forbidden, err) => json_error(status, "forbidden", err.to_string()),
            (ErrorKind::DataNotFound, err) => json_error(status, "data not found", err.to_string()),
            (_, err) => json_error(status, "bad request", err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_its_status() {
        let cases = [
            (DomainError::unauthorized("token has expired"), StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden, StatusCode::FORBIDDEN),
            (DomainError::not_found("project"), StatusCode::NOT_FOUND),
            (DomainError::EventNotRunning, StatusCode::BAD_REQUEST),
            (DomainError::TeamAlreadyHasProject, StatusCode::BAD_REQUEST),
            (DomainError::invalid_status("assessed"), StatusCode::BAD_REQUEST),
            (DomainError::internal("pool timed out"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err.clone()).into_response().status(), status, "{err}");
        }
    }
}
