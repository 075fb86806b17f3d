use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::records::PatientProfile;
use shared_utils::AppState;

use crate::models::PatientError;
use crate::services::PatientService;

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound(err.to_string()),
            PatientError::Unauthorized | PatientError::AdminOnly => AppError::Forbidden(err.to_string()),
            PatientError::DatabaseError(e) => AppError::Storage(e.to_string()),
        }
    }
}

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<PatientProfile>>, AppError> {
    let service = PatientService::new(&state);
    Ok(Json(service.list_patients(&user).await?))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientProfile>, AppError> {
    let service = PatientService::new(&state);
    Ok(Json(service.get_patient(&patient_id, &user).await?))
}
