// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::records::{Appointment, Role};
use shared_utils::extractor::{require_role, ValidatedJson};
use shared_utils::AppState;
use uuid::Uuid;

use crate::models::{
    AppointmentError, AppointmentQueryParams, BookAppointmentRequest, UpdateAppointmentStatusRequest,
};
use crate::services::booking::AppointmentBookingService;

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::NotFound
            | AppointmentError::PatientNotFound
            | AppointmentError::DoctorNotFound => AppError::NotFound(e.to_string()),
            AppointmentError::MissingFields
            | AppointmentError::InvalidDate(_)
            | AppointmentError::InvalidTime(_)
            | AppointmentError::InvalidFilter(_)
            | AppointmentError::InvalidStatusUpdate => AppError::ValidationError(e.to_string()),
            AppointmentError::SlotNotAvailable | AppointmentError::InvalidStatusTransition(_) => {
                AppError::Conflict(e.to_string())
            }
            AppointmentError::Unauthorized(msg) => AppError::Forbidden(msg),
            AppointmentError::DatabaseError(err) => AppError::Storage(err.to_string()),
        }
    }
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ValidatedJson(request): ValidatedJson<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    // Patients book for themselves, admins for anyone
    require_role(&user, &[Role::Patient, Role::Admin])?;

    if user.role == Role::Patient {
        let requested = request.patient_id.as_deref().map(str::trim);
        if requested.is_some_and(|id| !id.is_empty() && !is_same_account(id, &user.id)) {
            return Err(AppError::Forbidden(
                "Not authorized to book appointment for this patient".to_string(),
            ));
        }
    }

    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service.book_appointment(request).await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateAppointmentStatusRequest>,
) -> Result<Json<Appointment>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service
        .cancel_appointment(&appointment_id, request, &user)
        .await?;

    Ok(Json(appointment))
}

// Ids compare as UUIDs so casing does not matter; unparsable ids only match verbatim
fn is_same_account(requested: &str, session_id: &str) -> bool {
    match (Uuid::parse_str(requested), Uuid::parse_str(session_id)) {
        (Ok(requested), Ok(session)) => requested == session,
        _ => requested == session_id,
    }
}

// ==============================================================================
// READ HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    Ok(Json(booking_service.get_appointment(&appointment_id, &user).await?))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(params): Query<AppointmentQueryParams>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    Ok(Json(booking_service.search_appointments(&params, &user).await?))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    Ok(Json(booking_service.get_doctor_appointments(&doctor_id, &user).await?))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    Ok(Json(booking_service.get_patient_appointments(&patient_id, &user).await?))
}
