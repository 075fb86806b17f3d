use std::cmp::Reverse;
use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use shared_database::{AppointmentFilter, RecordStore};
use shared_models::auth::User;
use shared_models::records::{Appointment, DoctorProfile, PatientProfile};
use shared_utils::AppState;

use crate::models::{AdminDashboard, DashboardError, DashboardTotals, DoctorDashboard, PatientDashboard};

pub struct DashboardService {
    store: Arc<dyn RecordStore>,
}

impl DashboardService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
        }
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn patient_dashboard(&self, user: &User) -> Result<PatientDashboard, DashboardError> {
        let patient_id = account_id(user)?;

        let (mut upcoming, mut past): (Vec<Appointment>, Vec<Appointment>) = self
            .store
            .appointments(&AppointmentFilter::by_patient(patient_id))
            .await?
            .into_iter()
            .partition(Appointment::is_upcoming);

        upcoming.sort_by(|a, b| a.schedule_key().cmp(&b.schedule_key()));
        past.sort_by(|a, b| b.schedule_key().cmp(&a.schedule_key()));

        let doctors = self
            .store
            .doctors()
            .await?
            .into_iter()
            .map(DoctorProfile::from)
            .collect();

        debug!("Patient dashboard: {} upcoming, {} past", upcoming.len(), past.len());
        Ok(PatientDashboard { upcoming, past, doctors })
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn doctor_dashboard(&self, user: &User) -> Result<DoctorDashboard, DashboardError> {
        let doctor_id = account_id(user)?;

        let mut appointments = self
            .store
            .appointments(&AppointmentFilter::by_doctor(doctor_id))
            .await?;
        appointments.sort_by(|a, b| b.schedule_key().cmp(&a.schedule_key()));

        let upcoming_count = appointments.iter().filter(|a| a.is_upcoming()).count();

        Ok(DoctorDashboard {
            appointments,
            upcoming_count,
        })
    }

    #[instrument(skip(self))]
    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, DashboardError> {
        let patients: Vec<PatientProfile> = self
            .store
            .patients()
            .await?
            .into_iter()
            .map(PatientProfile::from)
            .collect();
        let doctors: Vec<DoctorProfile> = self
            .store
            .doctors()
            .await?
            .into_iter()
            .map(DoctorProfile::from)
            .collect();

        // By date only; same-day bookings keep store order
        let mut appointments = self.store.appointments(&AppointmentFilter::all()).await?;
        appointments.sort_by_key(|a| Reverse(a.date));

        let totals = DashboardTotals {
            patients: patients.len(),
            doctors: doctors.len(),
            appointments: appointments.len(),
            upcoming_appointments: appointments.iter().filter(|a| a.is_upcoming()).count(),
        };

        Ok(AdminDashboard {
            totals,
            patients,
            doctors,
            appointments,
        })
    }
}

fn account_id(user: &User) -> Result<Uuid, DashboardError> {
    Uuid::parse_str(&user.id).map_err(|_| DashboardError::InvalidSession)
}
