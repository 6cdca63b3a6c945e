//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services/`: the workflow layer, one service per resource
//! - `routes/`: HTTP handlers, one file per resource
//! - `dto.rs`: query and body shapes that are not domain types
//! - `errors.rs`: the response envelope
//! - `extract.rs`: extractors that reject with the envelope

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use hackathon_auth::TokenValidator;
use hackathon_infra::Stores;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

/// Build the full HTTP router over the given persistence backend.
pub fn build_app(config: &AppConfig, stores: Stores) -> Router {
    let validator = TokenValidator::new(
        config.jwt_secret.as_bytes(),
        config.jwt_algorithm,
        stores.user_lookup(),
    );
    let auth_state = middleware::AuthState {
        validator: Arc::new(validator),
    };

    let services = Arc::new(services::AppServices::new(stores, config.default_page_limit));

    // Protected routes: the gate wraps each matched route, outside its role guard.
    // Unmatched paths skip it and reach the 404 fallback.
    let protected = routes::router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    routes::public_router()
        .merge(protected)
        .fallback(routes::system::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_requests))
                .layer(Extension(services)),
        )
}
