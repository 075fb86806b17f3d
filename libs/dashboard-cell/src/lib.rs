// =====================================================================================
// DASHBOARD CELL - ROLE ROUTING & DASHBOARD VIEW-MODELS
// =====================================================================================
//
// Decides which dashboard a session may open and assembles the data each role's
// dashboard shows. Rendering is left to the client.
//
// =====================================================================================

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    AdminDashboard, DashboardError, DashboardInfo, DashboardTotals, DoctorDashboard,
    NavLink, PatientDashboard, RouteDecision,
};

pub use services::{DashboardService, RoleRouter};

pub use router::create_dashboard_router;
