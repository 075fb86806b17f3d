// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use shared_models::records::AppointmentStatus;

use crate::models::{AppointmentError, CancelOutcome};

pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Parse the status requested by a client update.
    ///
    /// Cancellation is the only client-initiated transition, so anything other
    /// than `"canceled"` (including a missing value) is rejected.
    pub fn parse_requested_status(&self, requested: Option<&str>) -> Result<AppointmentStatus, AppointmentError> {
        match requested.map(str::trim) {
            Some("canceled") => Ok(AppointmentStatus::Canceled),
            other => {
                warn!("Rejected status update: {:?}", other);
                Err(AppointmentError::InvalidStatusUpdate)
            }
        }
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Upcoming => vec![AppointmentStatus::Canceled],
            // Terminal states
            AppointmentStatus::Completed => vec![],
            AppointmentStatus::Canceled => vec![],
        }
    }

    pub fn validate_cancellation(&self, current_status: AppointmentStatus) -> Result<CancelOutcome, AppointmentError> {
        debug!("Validating cancellation from {}", current_status);

        if current_status == AppointmentStatus::Canceled {
            return Ok(CancelOutcome::AlreadyCanceled);
        }

        if !self
            .get_valid_transitions(current_status)
            .contains(&AppointmentStatus::Canceled)
        {
            warn!("Invalid status transition attempted: {} -> canceled", current_status);
            return Err(AppointmentError::InvalidStatusTransition(current_status));
        }

        Ok(CancelOutcome::Apply)
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
