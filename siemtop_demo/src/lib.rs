//! siemtop_demo: a small SIEM API server with generated security events.
//!
//! Serves the same `/api/health`, `/api/events` and `/api/stats` endpoints the
//! siemtop client talks to, behind HTTP Basic auth.

pub mod auth;
pub mod config;
pub mod generate;
pub mod handlers;
pub mod state;
pub mod stats;

use axum::{middleware, routing::get, Router};

pub use config::{parse_port, Config};
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/events", get(handlers::events))
        .route("/api/stats", get(handlers::stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ))
        .with_state(state)
}
