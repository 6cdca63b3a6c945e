use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::Response;

use hackathon_auth::{AuthenticatedSession, Identity};

use crate::app::errors::json_error;

/// Who is calling, resolved by the authentication gate for this request only.
///
/// Handlers take it as an extractor; a route outside the gate gets a 401
/// instead of a missing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    identity: Identity,
    token: String,
}

impl RequestContext {
    pub fn new(identity: Identity, token: String) -> Self {
        Self { identity, token }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The raw bearer token, for forwarding to downstream collaborators.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl From<AuthenticatedSession> for RequestContext {
    fn from(session: AuthenticatedSession) -> Self {
        Self::new(session.identity, session.token)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| {
                json_error(StatusCode::UNAUTHORIZED, "unauthorized", "authentication required")
            })
    }
}
