use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use chrono::Utc;
use tracing::Instrument;

use hackathon_auth::{AuthError, Role, TokenValidator, authorize_roles};
use hackathon_core::DomainError;
use hackathon_observability::request::{new_request_id, request_span};

use crate::app::errors::{ApiError, json_error};
use crate::context::RequestContext;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<TokenValidator>,
}

/// Authentication gate for the protected route group.
///
/// Resolves the bearer token to an identity and inserts a [`RequestContext`].
/// Every failure short-circuits before the handler runs.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(token) => token.to_string(),
        Err(status) => {
            tracing::debug!(kind = ?AuthError::MissingToken, "authentication failed");
            return json_error(status, "unauthorized", AuthError::MissingToken.to_string());
        }
    };

    let session = match state.validator.validate(&token, Utc::now()).await {
        Ok(session) => session,
        Err(err) => {
            tracing::debug!(kind = ?err, "authentication failed");
            return ApiError::from(DomainError::from(err)).into_response();
        }
    };

    tracing::Span::current().record("user_id", session.identity.id.get());
    req.extensions_mut().insert(RequestContext::from(session));

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}

/// Roles a route admits. Empty admits any authenticated identity.
#[derive(Debug, Clone, Copy)]
pub struct RoleGuard {
    allowed: &'static [Role],
}

impl RoleGuard {
    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }
}

/// Role guard. Runs after the gate and only reads the context it left behind.
pub async fn require_roles(State(guard): State<RoleGuard>, req: Request, next: Next) -> Response {
    let Some(ctx) = req.extensions().get::<RequestContext>() else {
        return json_error(StatusCode::UNAUTHORIZED, "unauthorized", "authentication required");
    };

    if authorize_roles(ctx.identity(), guard.allowed).is_err() {
        tracing::debug!(role = %ctx.identity().role, "role guard rejected request");
        return json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "you are not allowed to access this resource",
        );
    }

    next.run(req).await
}

/// Attach the role guard to one method router.
pub fn restrict(route: MethodRouter, allowed: &'static [Role]) -> MethodRouter {
    route.route_layer(axum::middleware::from_fn_with_state(
        RoleGuard::new(allowed),
        require_roles,
    ))
}

/// Root span per request, tagged with a fresh request id echoed back in a header.
pub async fn trace_requests(req: Request, next: Next) -> Response {
    let request_id = new_request_id();
    let span = request_span(req.method().as_str(), req.uri().path(), request_id);

    async move {
        let mut res = next.run(req).await;
        tracing::info!(status = res.status().as_u16(), "request completed");
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            res.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        res
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn bearer_token_is_trimmed() {
        assert_eq!(extract_bearer(&headers("Bearer  abc.def.ghi ")), Ok("abc.def.ghi"));
    }

    #[test]
    fn missing_or_empty_bearer_is_unauthorized() {
        assert_eq!(extract_bearer(&HeaderMap::new()), Err(StatusCode::UNAUTHORIZED));
        assert_eq!(extract_bearer(&headers("Bearer ")), Err(StatusCode::UNAUTHORIZED));
        assert_eq!(extract_bearer(&headers("Basic dXNlcjpwYXNz")), Err(StatusCode::UNAUTHORIZED));
    }
}
