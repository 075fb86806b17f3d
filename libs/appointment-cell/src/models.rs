// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};

use shared_database::StoreError;
use shared_models::records::AppointmentStatus;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Fields arrive as strings and are validated by the booking service, so an
/// absent or malformed value is reported as a validation error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentQueryParams {
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
    pub status: Option<String>,
}

// ==============================================================================
// LIFECYCLE
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The appointment is upcoming and will be marked canceled.
    Apply,
    /// Already canceled; the record is returned untouched.
    AlreadyCanceled,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid appointment date: {0}")]
    InvalidDate(String),

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("Invalid query parameter: {0}")]
    InvalidFilter(String),

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("This time slot is already booked.")]
    SlotNotAvailable,

    #[error("Invalid status update")]
    InvalidStatusUpdate,

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    DatabaseError(StoreError),
}

impl From<StoreError> for AppointmentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SlotTaken { .. } => AppointmentError::SlotNotAvailable,
            other => AppointmentError::DatabaseError(other),
        }
    }
}
