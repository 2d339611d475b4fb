//! Router assembly

use axum::routing::get;
use axum::Router;

use crate::handlers::{health, identity};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/identity/{action}", get(identity::gateway))
        .with_state(state)
}
