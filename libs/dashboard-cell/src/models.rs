// =====================================================================================
// DASHBOARD CELL MODELS
// =====================================================================================

use serde::{Deserialize, Serialize};

use shared_database::StoreError;
use shared_models::records::{Appointment, DoctorProfile, PatientProfile, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub label: String,
    pub path: String,
}

/// Where a session lands and what it may navigate to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardInfo {
    pub role: Role,
    pub path: String,
    pub navigation: Vec<NavLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Render(Role),
    Redirect(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDashboard {
    /// Soonest first.
    pub upcoming: Vec<Appointment>,
    /// Completed and canceled, most recent first.
    pub past: Vec<Appointment>,
    pub doctors: Vec<DoctorProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDashboard {
    pub appointments: Vec<Appointment>,
    pub upcoming_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    pub patients: usize,
    pub doctors: usize,
    pub appointments: usize,
    pub upcoming_appointments: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub totals: DashboardTotals,
    pub patients: Vec<PatientProfile>,
    pub doctors: Vec<DoctorProfile>,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Session does not identify an account")]
    InvalidSession,

    #[error("Database error: {0}")]
    DatabaseError(#[from] StoreError),
}
