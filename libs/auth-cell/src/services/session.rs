use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use shared_config::AppConfig;
use shared_database::RecordStore;
use shared_models::auth::{SessionResponse, User};
use shared_models::records::{DoctorProfile, PatientProfile, Role};
use shared_utils::jwt::issue_token;
use shared_utils::AppState;

use crate::models::{required, AuthError, EmailLoginRequest, UsernameLoginRequest};
use crate::services::credentials::CredentialService;

pub const ADMIN_USER_ID: &str = "admin";

pub struct SessionService {
    config: Arc<AppConfig>,
    store: Arc<dyn RecordStore>,
}

impl SessionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            config: Arc::clone(&state.config),
            store: Arc::clone(&state.store),
        }
    }

    pub async fn login_patient(
        &self,
        request: EmailLoginRequest,
    ) -> Result<SessionResponse<PatientProfile>, AuthError> {
        let email = CredentialService::normalize_email(&required(&request.email)?);
        let password = required(&request.password)?;

        let patient = self
            .store
            .patient_by_email(&email)
            .await?
            .filter(|p| CredentialService::verify_password(&password, &p.password_hash))
            .ok_or_else(|| {
                warn!("Failed patient login for {}", email);
                AuthError::InvalidCredentials("email")
            })?;

        let token = self.issue(User {
            id: patient.id.to_string(),
            email: Some(patient.email.clone()),
            role: Role::Patient,
            display_name: Some(patient.full_name.clone()),
            created_at: Some(Utc::now()),
        })?;

        info!("Patient {} logged in", patient.id);
        Ok(SessionResponse {
            token,
            user: patient.into(),
        })
    }

    pub async fn login_doctor(
        &self,
        request: UsernameLoginRequest,
    ) -> Result<SessionResponse<DoctorProfile>, AuthError> {
        let username = required(&request.username)?;
        let password = required(&request.password)?;

        let doctor = self
            .store
            .doctor_by_username(&username)
            .await?
            .filter(|d| CredentialService::verify_password(&password, &d.password_hash))
            .ok_or_else(|| {
                warn!("Failed doctor login for {}", username);
                AuthError::InvalidCredentials("username")
            })?;

        let token = self.issue(User {
            id: doctor.id.to_string(),
            email: Some(doctor.email.clone()),
            role: Role::Doctor,
            display_name: Some(doctor.full_name.clone()),
            created_at: Some(Utc::now()),
        })?;

        info!("Doctor {} logged in", doctor.id);
        Ok(SessionResponse {
            token,
            user: doctor.into(),
        })
    }

    /// Admin credentials come from configuration, not the record store.
    pub fn login_admin(&self, request: UsernameLoginRequest) -> Result<SessionResponse<User>, AuthError> {
        let username = required(&request.username)?;
        let password = required(&request.password)?;

        if !self.config.is_admin_login_enabled() {
            return Err(AuthError::AdminLoginDisabled);
        }

        if username != self.config.admin_username || password != self.config.admin_password {
            warn!("Failed admin login for {}", username);
            return Err(AuthError::InvalidCredentials("username"));
        }

        let user = User {
            id: ADMIN_USER_ID.to_string(),
            email: None,
            role: Role::Admin,
            display_name: Some(username),
            created_at: Some(Utc::now()),
        };
        let token = self.issue(user.clone())?;

        info!("Admin logged in");
        Ok(SessionResponse { token, user })
    }

    fn issue(&self, user: User) -> Result<String, AuthError> {
        issue_token(
            &user,
            &self.config.session_jwt_secret,
            self.config.session_ttl_hours,
        )
        .map_err(AuthError::Session)
    }
}
