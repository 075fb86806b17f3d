use serde::{Deserialize, Serialize};

use shared_database::StoreError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorSearchFilters {
    pub specialization: Option<String>,
}

impl DoctorSearchFilters {
    /// Case-insensitive exact match on specialization; blank filters match all.
    pub fn matches(&self, specialization: &str) -> bool {
        match self.specialization.as_deref().map(str::trim) {
            Some(wanted) if !wanted.is_empty() => wanted.eq_ignore_ascii_case(specialization.trim()),
            _ => true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(#[from] StoreError),
}
