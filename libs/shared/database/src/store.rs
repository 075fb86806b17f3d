use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::records::{Appointment, AppointmentStatus, Doctor, Patient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Email => f.write_str("email"),
            UniqueField::Username => f.write_str("username"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Slot already booked for doctor {doctor_id} on {date} at {time}")]
    SlotTaken {
        doctor_id: Uuid,
        date: NaiveDate,
        time: String,
    },

    #[error("An account with this {field} already exists")]
    Duplicate { field: UniqueField },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Remote store error ({status}): {body}")]
    Remote { status: u16, body: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Predicate over appointments; set fields are ANDed, unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFilter {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_doctor(doctor_id: Uuid) -> Self {
        Self {
            doctor_id: Some(doctor_id),
            ..Self::default()
        }
    }

    pub fn by_patient(patient_id: Uuid) -> Self {
        Self {
            patient_id: Some(patient_id),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.patient_id.map_or(true, |id| appointment.patient_id == id)
            && self.doctor_id.map_or(true, |id| appointment.doctor_id == id)
            && self.status.map_or(true, |status| appointment.status == status)
    }
}

/// Persistence for the three record collections.
///
/// Inserts enforce the uniqueness invariants atomically with respect to other
/// writers: one upcoming appointment per (doctor, date, time), unique emails
/// across patients and doctors, unique doctor usernames. Listings keep
/// insertion order where the backend has one.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn patients(&self) -> StoreResult<Vec<Patient>>;

    async fn doctors(&self) -> StoreResult<Vec<Doctor>>;

    async fn appointments(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>>;

    async fn patient(&self, id: Uuid) -> StoreResult<Option<Patient>>;

    async fn doctor(&self, id: Uuid) -> StoreResult<Option<Doctor>>;

    async fn appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>>;

    async fn patient_by_email(&self, email: &str) -> StoreResult<Option<Patient>>;

    async fn doctor_by_username(&self, username: &str) -> StoreResult<Option<Doctor>>;

    /// Whether any patient or doctor is registered under `email`.
    async fn email_taken(&self, email: &str) -> StoreResult<bool>;

    async fn insert_patient(&self, patient: Patient) -> StoreResult<Patient>;

    async fn insert_doctor(&self, doctor: Doctor) -> StoreResult<Doctor>;

    /// Fails with [`StoreError::SlotTaken`] if an upcoming appointment already
    /// holds the same doctor/date/time.
    async fn insert_appointment(&self, appointment: Appointment) -> StoreResult<Appointment>;

    /// Returns `None` when no appointment has this id.
    async fn set_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> StoreResult<Option<Appointment>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(doctor_id: Uuid, patient_id: Uuid, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id,
            patient_name: "P".to_string(),
            doctor_name: "D".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            time: "10:00".to_string(),
            status,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let apt = appointment(Uuid::new_v4(), Uuid::new_v4(), AppointmentStatus::Canceled);
        assert!(AppointmentFilter::all().matches(&apt));
    }

    #[test]
    fn test_filter_fields_are_anded() {
        let doctor_id = Uuid::new_v4();
        let patient_id = Uuid::new_v4();
        let apt = appointment(doctor_id, patient_id, AppointmentStatus::Upcoming);

        assert!(AppointmentFilter::by_doctor(doctor_id).matches(&apt));
        assert!(AppointmentFilter::by_patient(patient_id).matches(&apt));
        assert!(AppointmentFilter::by_doctor(doctor_id)
            .with_status(AppointmentStatus::Upcoming)
            .matches(&apt));
        assert!(!AppointmentFilter::by_doctor(doctor_id)
            .with_status(AppointmentStatus::Canceled)
            .matches(&apt));

        let mixed = AppointmentFilter {
            doctor_id: Some(doctor_id),
            patient_id: Some(Uuid::new_v4()),
            status: None,
        };
        assert!(!mixed.matches(&apt));
    }
}
