use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn auth_routes(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/patient/register", post(handlers::register_patient))
        .route("/doctor/register", post(handlers::register_doctor))
        .route("/patient/login", post(handlers::login_patient))
        .route("/doctor/login", post(handlers::login_doctor))
        .route("/admin/login", post(handlers::login_admin))
        .route("/validate", post(handlers::validate_token));

    let protected_routes = Router::new()
        .route("/me", get(handlers::me))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
