use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, NaiveDate, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::{default_time_slots, AppConfig};
use shared_database::{JsonFileStore, RecordStore};
use shared_models::auth::User;
use shared_models::records::{Appointment, AppointmentStatus, Doctor, Patient, Role};

use crate::state::AppState;

pub struct TestConfig {
    pub jwt_secret: String,
    pub admin_username: String,
    pub admin_password: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "admin-test-password".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            session_jwt_secret: self.jwt_secret.clone(),
            admin_username: self.admin_username.clone(),
            admin_password: self.admin_password.clone(),
            booking_time_slots: default_time_slots(),
            ..AppConfig::default()
        }
    }

    /// State over a fresh in-memory store.
    pub fn to_state(&self) -> Arc<AppState> {
        self.to_state_with_store(Arc::new(JsonFileStore::in_memory()))
    }

    pub fn to_state_with_store(&self, store: Arc<dyn RecordStore>) -> Arc<AppState> {
        Arc::new(AppState::new(self.to_app_config(), store))
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: Role::Patient,
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role,
        }
    }

    pub fn with_id(id: impl ToString, role: Role) -> Self {
        Self {
            id: id.to_string(),
            email: format!("{}@example.com", role),
            role,
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, Role::Doctor)
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, Role::Patient)
    }

    pub fn admin() -> Self {
        Self {
            id: "admin".to_string(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
        }
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: self.role,
            display_name: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }

    pub fn bearer(user: &TestUser, config: &AppConfig) -> String {
        format!("Bearer {}", Self::create_test_token(user, &config.session_jwt_secret, Some(24)))
    }
}

/// Builders for records seeded straight into a store.
pub struct TestRecords;

impl TestRecords {
    pub fn patient(full_name: &str, email: &str) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role: Role::Patient,
        }
    }

    pub fn doctor(full_name: &str, username: &str, specialization: &str) -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            email: format!("{}@clinic.test", username),
            username: username.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            specialization: specialization.to_string(),
            bio: format!("{} specialist", specialization),
            role: Role::Doctor,
        }
    }

    pub fn appointment(patient: &Patient, doctor: &Doctor, date: &str, time: &str) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            doctor_id: doctor.id,
            patient_name: patient.full_name.clone(),
            doctor_name: doctor.full_name.clone(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("test dates are YYYY-MM-DD"),
            time: time.to_string(),
            status: AppointmentStatus::Upcoming,
        }
    }
}
