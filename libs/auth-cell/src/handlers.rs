use std::sync::Arc;

use axum::{
    extract::{Extension, Json, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
};
use tracing::debug;

use shared_models::auth::{SessionResponse, TokenResponse, User};
use shared_models::error::AppError;
use shared_models::records::{DoctorProfile, PatientProfile};
use shared_utils::extractor::{bearer_token, ValidatedJson};
use shared_utils::jwt::validate_token as verify_session;
use shared_utils::AppState;

use crate::models::{
    AuthError, EmailLoginRequest, RegisterDoctorRequest, RegisterPatientRequest,
    UsernameLoginRequest,
};
use crate::services::{RegistrationService, SessionService};

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingFields | AuthError::InvalidEmail => {
                AppError::ValidationError(err.to_string())
            }
            AuthError::EmailTaken | AuthError::UsernameTaken => AppError::Conflict(err.to_string()),
            AuthError::InvalidCredentials(_) | AuthError::AdminLoginDisabled => {
                AppError::Auth(err.to_string())
            }
            AuthError::Hashing(msg) | AuthError::Session(msg) => AppError::Internal(msg),
            AuthError::Storage(e) => AppError::Storage(e.to_string()),
        }
    }
}

// ==============================================================================
// REGISTRATION
// ==============================================================================

pub async fn register_patient(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RegisterPatientRequest>,
) -> Result<(StatusCode, Json<PatientProfile>), AppError> {
    let service = RegistrationService::new(&state);
    let profile = service.register_patient(request).await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn register_doctor(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RegisterDoctorRequest>,
) -> Result<(StatusCode, Json<DoctorProfile>), AppError> {
    let service = RegistrationService::new(&state);
    let profile = service.register_doctor(request).await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

// ==============================================================================
// LOGIN
// ==============================================================================

pub async fn login_patient(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<EmailLoginRequest>,
) -> Result<Json<SessionResponse<PatientProfile>>, AppError> {
    let service = SessionService::new(&state);
    Ok(Json(service.login_patient(request).await?))
}

pub async fn login_doctor(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UsernameLoginRequest>,
) -> Result<Json<SessionResponse<DoctorProfile>>, AppError> {
    let service = SessionService::new(&state);
    Ok(Json(service.login_doctor(request).await?))
}

pub async fn login_admin(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UsernameLoginRequest>,
) -> Result<Json<SessionResponse<User>>, AppError> {
    let service = SessionService::new(&state);
    Ok(Json(service.login_admin(request)?))
}

// ==============================================================================
// SESSION
// ==============================================================================

pub async fn validate_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let header_value = headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str())
        .transpose()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;
    let token = bearer_token(header_value)?;

    match verify_session(token, &state.config.session_jwt_secret) {
        Ok(user) => Ok(Json(TokenResponse {
            valid: true,
            user_id: user.id,
            email: user.email,
            role: user.role,
        })),
        Err(err) => Err(AppError::Auth(err)),
    }
}

pub async fn me(Extension(user): Extension<User>) -> Json<User> {
    debug!("Returning session for user: {}", user.id);
    Json(user)
}
