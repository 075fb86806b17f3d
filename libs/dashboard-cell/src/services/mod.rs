pub mod overview;
pub mod role_router;

pub use overview::DashboardService;
pub use role_router::RoleRouter;
