use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use shared_models::error::AppError;
use shared_models::records::DoctorProfile;
use shared_utils::AppState;

use crate::models::{DoctorError, DoctorSearchFilters};
use crate::services::doctor::DoctorService;

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound(err.to_string()),
            DoctorError::DatabaseError(e) => AppError::Storage(e.to_string()),
        }
    }
}

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn search_doctors_public(
    State(state): State<Arc<AppState>>,
    Query(filters): Query<DoctorSearchFilters>,
) -> Result<Json<Vec<DoctorProfile>>, AppError> {
    let doctor_service = DoctorService::new(&state);
    Ok(Json(doctor_service.search_doctors(&filters).await?))
}

#[axum::debug_handler]
pub async fn get_doctor_public(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<DoctorProfile>, AppError> {
    let doctor_service = DoctorService::new(&state);
    Ok(Json(doctor_service.get_doctor(&doctor_id).await?))
}
