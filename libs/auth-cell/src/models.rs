use serde::{Deserialize, Serialize};

use shared_database::{StoreError, UniqueField};

// ==============================================================================
// REQUEST MODELS
// ==============================================================================
//
// Every field is optional on the wire so that absent fields surface as a
// validation error rather than a body rejection.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPatientRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDoctorRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub specialization: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailLoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsernameLoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("This username is already taken")]
    UsernameTaken,

    #[error("Invalid {0} or password")]
    InvalidCredentials(&'static str),

    #[error("Admin login is not configured")]
    AdminLoginDisabled,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { field: UniqueField::Email } => AuthError::EmailTaken,
            StoreError::Duplicate { field: UniqueField::Username } => AuthError::UsernameTaken,
            other => AuthError::Storage(other),
        }
    }
}

/// Trimmed, non-empty value of a required field.
pub fn required(value: &Option<String>) -> Result<String, AuthError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(AuthError::MissingFields)
}
