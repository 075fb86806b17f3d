// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{AppointmentFilter, RecordStore};
use shared_models::auth::User;
use shared_models::records::{Appointment, AppointmentStatus, Role};
use shared_utils::AppState;

use crate::models::{
    AppointmentError, AppointmentQueryParams, BookAppointmentRequest, CancelOutcome,
    UpdateAppointmentStatusRequest,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;

pub struct AppointmentBookingService {
    store: Arc<dyn RecordStore>,
    conflict_service: ConflictDetectionService,
    lifecycle_service: AppointmentLifecycleService,
    time_slots: Vec<String>,
}

impl AppointmentBookingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            conflict_service: ConflictDetectionService::new(Arc::clone(&state.store)),
            lifecycle_service: AppointmentLifecycleService::new(),
            time_slots: state.config.booking_time_slots.clone(),
        }
    }

    // ==========================================================================
    // BOOKING
    // ==========================================================================

    /// Book a slot for a patient with a doctor.
    ///
    /// Validation runs in this order: required fields, date and time format,
    /// patient and doctor existence, then the slot check. The store enforces
    /// slot uniqueness again on insert, so a concurrent booking that slips
    /// past the early check still fails with `SlotNotAvailable`.
    pub async fn book_appointment(&self, request: BookAppointmentRequest) -> Result<Appointment, AppointmentError> {
        let patient_id = required(&request.patient_id)?;
        let doctor_id = required(&request.doctor_id)?;
        let date = required(&request.date)?;
        let time = required(&request.time)?;

        // Only the canonical zero-padded form is accepted
        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .ok()
            .filter(|parsed| parsed.format("%Y-%m-%d").to_string() == date)
            .ok_or_else(|| AppointmentError::InvalidDate(date.clone()))?;
        if !self.time_slots.iter().any(|slot| *slot == time) {
            return Err(AppointmentError::InvalidTime(time));
        }

        info!("Booking appointment for patient {} with doctor {} on {} at {}",
              patient_id, doctor_id, date, time);

        let patient = match Uuid::parse_str(&patient_id) {
            Ok(id) => self.store.patient(id).await?,
            Err(_) => None,
        }
        .ok_or(AppointmentError::PatientNotFound)?;

        let doctor = match Uuid::parse_str(&doctor_id) {
            Ok(id) => self.store.doctor(id).await?,
            Err(_) => None,
        }
        .ok_or(AppointmentError::DoctorNotFound)?;

        self.conflict_service.ensure_slot_free(doctor.id, date, &time).await?;

        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            doctor_id: doctor.id,
            patient_name: patient.full_name,
            doctor_name: doctor.full_name,
            date,
            time,
            status: AppointmentStatus::Upcoming,
        };

        let appointment = self.store.insert_appointment(appointment).await?;
        info!("Appointment {} booked", appointment.id);

        Ok(appointment)
    }

    // ==========================================================================
    // CANCELLATION
    // ==========================================================================

    /// Apply a client status update. Only cancellation by the appointment's
    /// patient or an admin is allowed.
    pub async fn cancel_appointment(
        &self,
        appointment_id: &str,
        request: UpdateAppointmentStatusRequest,
        user: &User,
    ) -> Result<Appointment, AppointmentError> {
        let new_status = self
            .lifecycle_service
            .parse_requested_status(request.status.as_deref())?;

        let appointment = self.find_appointment(appointment_id).await?;

        if !user.owns_or_admin(&appointment.patient_id.to_string()) {
            warn!("User {} attempted to cancel appointment {} they do not own", user.id, appointment.id);
            return Err(AppointmentError::Unauthorized(
                "Not authorized to cancel this appointment".to_string(),
            ));
        }

        match self.lifecycle_service.validate_cancellation(appointment.status)? {
            CancelOutcome::AlreadyCanceled => {
                debug!("Appointment {} already canceled", appointment.id);
                Ok(appointment)
            }
            CancelOutcome::Apply => {
                let updated = self
                    .store
                    .set_appointment_status(appointment.id, new_status)
                    .await?
                    .ok_or(AppointmentError::NotFound)?;

                info!("Appointment {} canceled by {}", updated.id, user.id);
                Ok(updated)
            }
        }
    }

    // ==========================================================================
    // READS
    // ==========================================================================

    /// Participants (the patient or the doctor) and admins may read an appointment.
    pub async fn get_appointment(&self, appointment_id: &str, user: &User) -> Result<Appointment, AppointmentError> {
        let appointment = self.find_appointment(appointment_id).await?;

        let is_participant = user.id == appointment.patient_id.to_string()
            || user.id == appointment.doctor_id.to_string();
        if !is_participant && !user.is_admin() {
            return Err(AppointmentError::Unauthorized(
                "Not authorized to view this appointment".to_string(),
            ));
        }

        Ok(appointment)
    }

    pub async fn search_appointments(
        &self,
        params: &AppointmentQueryParams,
        user: &User,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let filter = self.scoped_filter(params, user)?;
        debug!("Searching appointments with filter: {:?}", filter);

        Ok(self.store.appointments(&filter).await?)
    }

    pub async fn get_doctor_appointments(&self, doctor_id: &str, user: &User) -> Result<Vec<Appointment>, AppointmentError> {
        let params = AppointmentQueryParams {
            doctor_id: Some(doctor_id.to_string()),
            ..Default::default()
        };
        self.search_appointments(&params, user).await
    }

    pub async fn get_patient_appointments(&self, patient_id: &str, user: &User) -> Result<Vec<Appointment>, AppointmentError> {
        let params = AppointmentQueryParams {
            patient_id: Some(patient_id.to_string()),
            ..Default::default()
        };
        self.search_appointments(&params, user).await
    }

    /// Narrow a listing to what the caller may see.
    ///
    /// Admins get exactly the filter they asked for. Doctors and patients are
    /// pinned to their own id; naming another owner is refused rather than
    /// silently rewritten.
    pub fn scoped_filter(
        &self,
        params: &AppointmentQueryParams,
        user: &User,
    ) -> Result<AppointmentFilter, AppointmentError> {
        let mut filter = AppointmentFilter {
            doctor_id: parse_filter_id("doctorId", params.doctor_id.as_deref())?,
            patient_id: parse_filter_id("patientId", params.patient_id.as_deref())?,
            status: parse_filter_status(params.status.as_deref())?,
        };

        let slot = match user.role {
            Role::Admin => return Ok(filter),
            Role::Doctor => &mut filter.doctor_id,
            Role::Patient => &mut filter.patient_id,
        };

        let own_id = Uuid::parse_str(&user.id).map_err(|_| {
            AppointmentError::Unauthorized("Session does not identify an account".to_string())
        })?;

        if slot.is_some_and(|requested| requested != own_id) {
            return Err(AppointmentError::Unauthorized(
                "Not authorized to view appointments of another account".to_string(),
            ));
        }

        *slot = Some(own_id);
        Ok(filter)
    }

    async fn find_appointment(&self, appointment_id: &str) -> Result<Appointment, AppointmentError> {
        let id = Uuid::parse_str(appointment_id).map_err(|_| AppointmentError::NotFound)?;

        self.store
            .appointment(id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }
}

fn required(value: &Option<String>) -> Result<String, AppointmentError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(AppointmentError::MissingFields)
}

fn parse_filter_id(name: &str, value: Option<&str>) -> Result<Option<Uuid>, AppointmentError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| AppointmentError::InvalidFilter(format!("{} must be a UUID", name))),
    }
}

fn parse_filter_status(value: Option<&str>) -> Result<Option<AppointmentStatus>, AppointmentError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some("upcoming") => Ok(Some(AppointmentStatus::Upcoming)),
        Some("completed") => Ok(Some(AppointmentStatus::Completed)),
        Some("canceled") => Ok(Some(AppointmentStatus::Canceled)),
        Some(other) => Err(AppointmentError::InvalidFilter(format!("unknown status '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_models::records::{Doctor, Patient};
    use shared_utils::test_utils::{TestConfig, TestRecords, TestUser};

    async fn setup() -> (Arc<AppState>, Patient, Doctor) {
        let state = TestConfig::default().to_state();
        let patient = state
            .store
            .insert_patient(TestRecords::patient("Jane Doe", "jane@x.com"))
            .await
            .unwrap();
        let doctor = state
            .store
            .insert_doctor(TestRecords::doctor("Gregory House", "house", "Cardiology"))
            .await
            .unwrap();
        (state, patient, doctor)
    }

    fn request(patient: &Patient, doctor: &Doctor, date: &str, time: &str) -> BookAppointmentRequest {
        BookAppointmentRequest {
            patient_id: Some(patient.id.to_string()),
            doctor_id: Some(doctor.id.to_string()),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
        }
    }

    #[tokio::test]
    async fn test_booking_copies_names_and_starts_upcoming() {
        let (state, patient, doctor) = setup().await;
        let service = AppointmentBookingService::new(&state);

        let appointment = service
            .book_appointment(request(&patient, &doctor, "2025-03-01", "10:00"))
            .await
            .unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Upcoming);
        assert_eq!(appointment.patient_name, "Jane Doe");
        assert_eq!(appointment.doctor_name, "Gregory House");
        assert_eq!(appointment.date.to_string(), "2025-03-01");
        assert_eq!(state.store.appointments(&AppointmentFilter::all()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_booking_validation_errors() {
        let (state, patient, doctor) = setup().await;
        let service = AppointmentBookingService::new(&state);

        let mut missing = request(&patient, &doctor, "2025-03-01", "10:00");
        missing.time = Some("   ".to_string());
        assert_matches!(service.book_appointment(missing).await, Err(AppointmentError::MissingFields));

        for date in ["2025-02-30", "2025-3-1", "2025-03-01T10:00"] {
            assert_matches!(
                service.book_appointment(request(&patient, &doctor, date, "10:00")).await,
                Err(AppointmentError::InvalidDate(rejected)) if rejected == date
            );
        }
        assert_matches!(
            service.book_appointment(request(&patient, &doctor, "2025-03-01", "12:00")).await,
            Err(AppointmentError::InvalidTime(_))
        );

        let mut unknown_doctor = request(&patient, &doctor, "2025-03-01", "10:00");
        unknown_doctor.doctor_id = Some(Uuid::new_v4().to_string());
        assert_matches!(service.book_appointment(unknown_doctor).await, Err(AppointmentError::DoctorNotFound));

        let mut garbage_patient = request(&patient, &doctor, "2025-03-01", "10:00");
        garbage_patient.patient_id = Some("42".to_string());
        assert_matches!(service.book_appointment(garbage_patient).await, Err(AppointmentError::PatientNotFound));

        assert!(state.store.appointments(&AppointmentFilter::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_double_booking_and_rebooking_after_cancel() {
        let (state, patient, doctor) = setup().await;
        let service = AppointmentBookingService::new(&state);

        let first = service
            .book_appointment(request(&patient, &doctor, "2025-03-01", "10:00"))
            .await
            .unwrap();
        assert_matches!(
            service.book_appointment(request(&patient, &doctor, "2025-03-01", "10:00")).await,
            Err(AppointmentError::SlotNotAvailable)
        );

        let owner = TestUser::with_id(patient.id, Role::Patient).to_user();
        let canceled = service
            .cancel_appointment(
                &first.id.to_string(),
                UpdateAppointmentStatusRequest { status: Some("canceled".to_string()) },
                &owner,
            )
            .await
            .unwrap();
        assert_eq!(canceled.status, AppointmentStatus::Canceled);
        assert_eq!(canceled.time, first.time);
        assert_eq!(canceled.patient_name, first.patient_name);

        let again = service
            .book_appointment(request(&patient, &doctor, "2025-03-01", "10:00"))
            .await
            .unwrap();
        assert_ne!(again.id, first.id);
    }

    #[tokio::test]
    async fn test_concurrent_bookings_of_one_slot() {
        let (state, patient, doctor) = setup().await;

        let attempts = (0..8).map(|_| {
            let state = Arc::clone(&state);
            let req = request(&patient, &doctor, "2025-03-01", "09:00");
            tokio::spawn(async move { AppointmentBookingService::new(&state).book_appointment(req).await })
        });

        let mut successes = 0;
        for handle in attempts.collect::<Vec<_>>() {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert_matches!(e, AppointmentError::SlotNotAvailable),
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_cancellation_checks() {
        let (state, patient, doctor) = setup().await;
        let service = AppointmentBookingService::new(&state);
        let booked = service
            .book_appointment(request(&patient, &doctor, "2025-03-01", "13:00"))
            .await
            .unwrap();
        let id = booked.id.to_string();
        let cancel = || UpdateAppointmentStatusRequest { status: Some("canceled".to_string()) };

        let owner = TestUser::with_id(patient.id, Role::Patient).to_user();
        assert_matches!(
            service
                .cancel_appointment(&id, UpdateAppointmentStatusRequest { status: Some("completed".to_string()) }, &owner)
                .await,
            Err(AppointmentError::InvalidStatusUpdate)
        );

        let stranger = TestUser::patient("other@x.com").to_user();
        assert_matches!(
            service.cancel_appointment(&id, cancel(), &stranger).await,
            Err(AppointmentError::Unauthorized(_))
        );
        let the_doctor = TestUser::with_id(doctor.id, Role::Doctor).to_user();
        assert_matches!(
            service.cancel_appointment(&id, cancel(), &the_doctor).await,
            Err(AppointmentError::Unauthorized(_))
        );
        assert_eq!(
            state.store.appointment(booked.id).await.unwrap().unwrap().status,
            AppointmentStatus::Upcoming
        );

        assert_matches!(
            service.cancel_appointment(&Uuid::new_v4().to_string(), cancel(), &owner).await,
            Err(AppointmentError::NotFound)
        );

        let admin = TestUser::admin().to_user();
        let canceled = service.cancel_appointment(&id, cancel(), &admin).await.unwrap();
        assert_eq!(canceled.status, AppointmentStatus::Canceled);

        let again = service.cancel_appointment(&id, cancel(), &owner).await.unwrap();
        assert_eq!(again, canceled);
    }

    #[tokio::test]
    async fn test_completed_appointment_cannot_be_canceled() {
        let (state, patient, doctor) = setup().await;
        let mut finished = TestRecords::appointment(&patient, &doctor, "2024-01-05", "09:00");
        finished.status = AppointmentStatus::Completed;
        let finished = state.store.insert_appointment(finished).await.unwrap();

        let service = AppointmentBookingService::new(&state);
        let owner = TestUser::with_id(patient.id, Role::Patient).to_user();

        assert_matches!(
            service
                .cancel_appointment(
                    &finished.id.to_string(),
                    UpdateAppointmentStatusRequest { status: Some("canceled".to_string()) },
                    &owner,
                )
                .await,
            Err(AppointmentError::InvalidStatusTransition(AppointmentStatus::Completed))
        );
    }

    #[tokio::test]
    async fn test_listing_scope() {
        let (state, patient, doctor) = setup().await;
        let service = AppointmentBookingService::new(&state);
        let other_doctor = state
            .store
            .insert_doctor(TestRecords::doctor("Lisa Cuddy", "cuddy", "Endocrinology"))
            .await
            .unwrap();
        service.book_appointment(request(&patient, &doctor, "2025-03-01", "10:00")).await.unwrap();
        service.book_appointment(request(&patient, &other_doctor, "2025-03-01", "10:00")).await.unwrap();

        let as_doctor = TestUser::with_id(doctor.id, Role::Doctor).to_user();
        let mine = service
            .search_appointments(&AppointmentQueryParams::default(), &as_doctor)
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].doctor_id, doctor.id);

        assert_matches!(
            service.get_doctor_appointments(&other_doctor.id.to_string(), &as_doctor).await,
            Err(AppointmentError::Unauthorized(_))
        );

        let as_patient = TestUser::with_id(patient.id, Role::Patient).to_user();
        assert_eq!(
            service
                .get_patient_appointments(&patient.id.to_string(), &as_patient)
                .await
                .unwrap()
                .len(),
            2
        );

        let admin = TestUser::admin().to_user();
        let by_doctor = service
            .get_doctor_appointments(&other_doctor.id.to_string(), &admin)
            .await
            .unwrap();
        assert_eq!(by_doctor.len(), 1);
        assert!(by_doctor.iter().all(|a| a.doctor_id == other_doctor.id));

        let bad_status = AppointmentQueryParams {
            status: Some("pending".to_string()),
            ..Default::default()
        };
        assert_matches!(
            service.search_appointments(&bad_status, &admin).await,
            Err(AppointmentError::InvalidFilter(_))
        );
    }
}
