use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub role: Role,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub iat: Option<u64>,
}

/// Identity of an authenticated caller, taken from a verified session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
    pub display_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True when this identity is the owner named by `id` (or an admin).
    pub fn owns_or_admin(&self, id: &str) -> bool {
        self.is_admin() || self.id == id
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub valid: bool,
    pub user_id: String,
    pub email: Option<String>,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse<T> {
    pub token: String,
    pub user: T,
}
