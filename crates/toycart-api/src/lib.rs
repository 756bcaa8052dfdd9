//! Toycart HTTP API: routes, state, credential verification and the
//! process-level concerns of the server binary.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod shutdown;
pub mod state;
pub mod telemetry;

use axum::Router;

use crate::state::AppState;

/// Builds the application router without transport layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/cart", routes::cart::router())
        .with_state(state)
}
