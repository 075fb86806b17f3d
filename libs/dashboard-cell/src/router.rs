// =====================================================================================
// DASHBOARD CELL ROUTER
// =====================================================================================

use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers::{get_dashboard, get_dashboard_view};

pub fn create_dashboard_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(get_dashboard))
        .route("/{view}", get(get_dashboard_view))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
