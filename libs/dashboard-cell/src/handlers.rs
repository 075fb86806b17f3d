// =====================================================================================
// DASHBOARD CELL HANDLERS
// =====================================================================================

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use tracing::info;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::records::Role;
use shared_utils::AppState;

use crate::models::{DashboardError, DashboardInfo, RouteDecision};
use crate::services::{DashboardService, RoleRouter};

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::InvalidSession => AppError::Auth(err.to_string()),
            DashboardError::DatabaseError(e) => AppError::Storage(e.to_string()),
        }
    }
}

pub async fn get_dashboard(Extension(user): Extension<User>) -> Json<DashboardInfo> {
    Json(RoleRouter::info(user.role))
}

/// Renders the requested dashboard, or answers `303 See Other` pointing at the
/// caller's own landing view.
pub async fn get_dashboard_view(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(view): Path<String>,
) -> Result<Response, AppError> {
    let role = match RoleRouter::decide(user.role, &view) {
        RouteDecision::Redirect(path) => {
            info!("Dashboard '{}' is not available to {} {}", view, user.role, user.id);
            return Ok(Redirect::to(&path).into_response());
        }
        RouteDecision::Render(role) => role,
    };

    let service = DashboardService::new(&state);
    let response = match role {
        Role::Patient => Json(service.patient_dashboard(&user).await?).into_response(),
        Role::Doctor => Json(service.doctor_dashboard(&user).await?).into_response(),
        Role::Admin => Json(service.admin_dashboard().await?).into_response(),
    };

    Ok(response)
}
