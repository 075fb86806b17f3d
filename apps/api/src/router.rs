use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use dashboard_cell::create_dashboard_router;
use doctor_cell::router::doctor_routes;
use patient_cell::create_patient_router;
use shared_utils::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "MediTrack API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/patients", create_patient_router(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/dashboard", create_dashboard_router(state))
}
