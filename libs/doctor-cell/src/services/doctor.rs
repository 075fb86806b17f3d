use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_database::RecordStore;
use shared_models::records::DoctorProfile;
use shared_utils::AppState;

use crate::models::{DoctorError, DoctorSearchFilters};

pub struct DoctorService {
    store: Arc<dyn RecordStore>,
}

impl DoctorService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
        }
    }

    pub async fn search_doctors(&self, filters: &DoctorSearchFilters) -> Result<Vec<DoctorProfile>, DoctorError> {
        debug!("Searching doctors with filters: {:?}", filters);

        let doctors = self
            .store
            .doctors()
            .await?
            .into_iter()
            .filter(|d| filters.matches(&d.specialization))
            .map(DoctorProfile::from)
            .collect::<Vec<_>>();

        debug!("Found {} doctors", doctors.len());
        Ok(doctors)
    }

    pub async fn get_doctor(&self, doctor_id: &str) -> Result<DoctorProfile, DoctorError> {
        let id = Uuid::parse_str(doctor_id).map_err(|_| DoctorError::NotFound)?;

        self.store
            .doctor(id)
            .await?
            .map(DoctorProfile::from)
            .ok_or(DoctorError::NotFound)
    }
}
