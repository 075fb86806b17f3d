use std::sync::Arc;

use axum::{routing::get, Router};

use shared_utils::AppState;

use crate::handlers;

// The directory is public; no session layer
pub fn doctor_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::search_doctors_public))
        .route("/{doctor_id}", get(handlers::get_doctor_public))
        .with_state(state)
}
