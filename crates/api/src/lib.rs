//! HTTP API: configuration, the authentication gate, the role guard, services and routes.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
