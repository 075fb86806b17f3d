use shared_database::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Unauthorized access to patient data")]
    Unauthorized,

    #[error("Only administrators can list patients")]
    AdminOnly,

    #[error("Database error: {0}")]
    DatabaseError(#[from] StoreError),
}
