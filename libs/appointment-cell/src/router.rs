// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::get,
    middleware,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppState>) -> Router {
    // All appointment operations require authentication
    let protected_routes = Router::new()
        .route("/", get(handlers::search_appointments).post(handlers::book_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment).patch(handlers::update_appointment_status))
        .route("/doctor/{doctor_id}", get(handlers::get_doctor_appointments))
        .route("/patient/{patient_id}", get(handlers::get_patient_appointments))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
