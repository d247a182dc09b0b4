use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::server::endpoints::{schedule, status};
use crate::types::AppState;

mod endpoints;
pub mod types;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(status::get_health))
        .route("/schedule", get(schedule::get_schedule))
        .route("/schedule/load", post(schedule::post_load_schedule))
        .route("/schedule/export", get(schedule::get_schedule_export))
        .with_state(app_state)
}
