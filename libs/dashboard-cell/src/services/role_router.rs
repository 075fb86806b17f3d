use tracing::debug;

use shared_models::records::Role;

use crate::models::{DashboardInfo, NavLink, RouteDecision};

pub struct RoleRouter;

impl RoleRouter {
    pub fn landing_path(role: Role) -> String {
        format!("/dashboard/{}", role)
    }

    pub fn navigation(role: Role) -> Vec<NavLink> {
        let links: Vec<(&str, String)> = match role {
            Role::Admin => vec![
                ("Overview", Self::landing_path(Role::Admin)),
                ("Patients", "/patients".to_string()),
                ("Doctors", "/doctors".to_string()),
                ("Appointments", "/appointments".to_string()),
            ],
            Role::Doctor => vec![
                ("Dashboard", Self::landing_path(Role::Doctor)),
                ("My Schedule", "/appointments".to_string()),
            ],
            Role::Patient => vec![
                ("Dashboard", Self::landing_path(Role::Patient)),
                ("Browse Doctors", "/doctors".to_string()),
                ("My Appointments", "/appointments".to_string()),
            ],
        };

        links
            .into_iter()
            .map(|(label, path)| NavLink {
                label: label.to_string(),
                path,
            })
            .collect()
    }

    pub fn info(role: Role) -> DashboardInfo {
        DashboardInfo {
            role,
            path: Self::landing_path(role),
            navigation: Self::navigation(role),
        }
    }

    /// A session may only open its own role's dashboard; anything else,
    /// including an unknown name, sends it back to its landing view.
    pub fn decide(role: Role, requested: &str) -> RouteDecision {
        match Role::parse(requested) {
            Some(wanted) if wanted == role => RouteDecision::Render(role),
            _ => {
                debug!("Redirecting {} away from dashboard '{}'", role, requested);
                RouteDecision::Redirect(Self::landing_path(role))
            }
        }
    }
}
