use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use shared_database::RecordStore;
use shared_models::records::{Doctor, DoctorProfile, Patient, PatientProfile, Role};
use shared_utils::AppState;

use crate::models::{required, AuthError, RegisterDoctorRequest, RegisterPatientRequest};
use crate::services::credentials::CredentialService;

pub struct RegistrationService {
    store: Arc<dyn RecordStore>,
}

impl RegistrationService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
        }
    }

    pub async fn register_patient(
        &self,
        request: RegisterPatientRequest,
    ) -> Result<PatientProfile, AuthError> {
        let full_name = required(&request.full_name)?;
        let email = CredentialService::normalize_email(&required(&request.email)?);
        let password = required(&request.password)?;

        if !CredentialService::is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }

        debug!("Registering patient account for: {}", email);

        if self.store.email_taken(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let patient = Patient {
            id: Uuid::new_v4(),
            full_name,
            email,
            password_hash: CredentialService::hash_password(&password)?,
            role: Role::Patient,
        };

        let patient = self.store.insert_patient(patient).await?;
        info!("Patient {} registered", patient.id);

        Ok(patient.into())
    }

    pub async fn register_doctor(
        &self,
        request: RegisterDoctorRequest,
    ) -> Result<DoctorProfile, AuthError> {
        let full_name = required(&request.full_name)?;
        let email = CredentialService::normalize_email(&required(&request.email)?);
        let username = required(&request.username)?;
        let password = required(&request.password)?;
        let specialization = required(&request.specialization)?;
        let bio = required(&request.bio)?;

        if !CredentialService::is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }

        debug!("Registering doctor account {} ({})", username, email);

        if self.store.email_taken(&email).await? {
            return Err(AuthError::EmailTaken);
        }
        if self.store.doctor_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let doctor = Doctor {
            id: Uuid::new_v4(),
            full_name,
            email,
            username,
            password_hash: CredentialService::hash_password(&password)?,
            specialization,
            bio,
            role: Role::Doctor,
        };

        let doctor = self.store.insert_doctor(doctor).await?;
        info!("Doctor {} registered ({})", doctor.id, doctor.specialization);

        Ok(doctor.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_database::{StoreError, UniqueField};
    use shared_utils::test_utils::TestConfig;

    fn patient_request(email: &str) -> RegisterPatientRequest {
        RegisterPatientRequest {
            full_name: Some("Jane Doe".to_string()),
            email: Some(email.to_string()),
            password: Some("hunter22".to_string()),
        }
    }

    fn doctor_request(email: &str, username: &str) -> RegisterDoctorRequest {
        RegisterDoctorRequest {
            full_name: Some("Gregory House".to_string()),
            email: Some(email.to_string()),
            username: Some(username.to_string()),
            password: Some("vicodin1".to_string()),
            specialization: Some("Cardiology".to_string()),
            bio: Some("Diagnostics".to_string()),
        }
    }

    #[tokio::test]
    async fn test_registration_error_variants() {
        let state = TestConfig::default().to_state();
        let service = RegistrationService::new(&state);

        let profile = service.register_patient(patient_request(" Jane@X.com ")).await.unwrap();
        assert_eq!(profile.email, "jane@x.com");

        assert_matches!(
            service.register_patient(RegisterPatientRequest::default()).await,
            Err(AuthError::MissingFields)
        );
        assert_matches!(
            service.register_patient(patient_request("jane-at-x.com")).await,
            Err(AuthError::InvalidEmail)
        );
        assert_matches!(
            service.register_doctor(doctor_request("JANE@x.com", "house")).await,
            Err(AuthError::EmailTaken)
        );

        service
            .register_doctor(doctor_request("house@clinic.test", "house"))
            .await
            .unwrap();
        assert_matches!(
            service.register_doctor(doctor_request("wilson@clinic.test", "house")).await,
            Err(AuthError::UsernameTaken)
        );
    }

    #[test]
    fn test_store_duplicates_map_to_conflict_variants() {
        assert_matches!(
            AuthError::from(StoreError::Duplicate { field: UniqueField::Email }),
            AuthError::EmailTaken
        );
        assert_matches!(
            AuthError::from(StoreError::Duplicate { field: UniqueField::Username }),
            AuthError::UsernameTaken
        );
    }
}
