use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_database::RecordStore;
use shared_models::auth::User;
use shared_models::records::PatientProfile;
use shared_utils::AppState;

use crate::models::PatientError;

pub struct PatientService {
    store: Arc<dyn RecordStore>,
}

impl PatientService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
        }
    }

    pub async fn list_patients(&self, user: &User) -> Result<Vec<PatientProfile>, PatientError> {
        if !user.is_admin() {
            return Err(PatientError::AdminOnly);
        }

        let patients = self.store.patients().await?;
        debug!("Listing {} patients", patients.len());

        Ok(patients.into_iter().map(PatientProfile::from).collect())
    }

    /// A patient may read only their own profile; admins may read any.
    pub async fn get_patient(&self, patient_id: &str, user: &User) -> Result<PatientProfile, PatientError> {
        if !user.owns_or_admin(patient_id) {
            return Err(PatientError::Unauthorized);
        }

        let id = Uuid::parse_str(patient_id).map_err(|_| PatientError::NotFound)?;

        self.store
            .patient(id)
            .await?
            .map(PatientProfile::from)
            .ok_or(PatientError::NotFound)
    }
}
