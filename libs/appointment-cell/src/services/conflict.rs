use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::{AppointmentFilter, RecordStore};
use shared_models::records::{Appointment, AppointmentStatus};

use crate::models::AppointmentError;

pub struct ConflictDetectionService {
    store: Arc<dyn RecordStore>,
}

impl ConflictDetectionService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// The upcoming appointment holding this slot, if any.
    pub async fn find_slot_holder(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: &str,
    ) -> Result<Option<Appointment>, AppointmentError> {
        debug!("Checking slot {} {} for doctor {}", date, time, doctor_id);

        let filter = AppointmentFilter::by_doctor(doctor_id).with_status(AppointmentStatus::Upcoming);
        let holder = self
            .store
            .appointments(&filter)
            .await?
            .into_iter()
            .find(|a| a.holds_slot(doctor_id, date, time));

        Ok(holder)
    }

    /// Fails with `SlotNotAvailable` when the slot is already held.
    ///
    /// This is the early, friendly check. The store repeats it atomically on
    /// insert, which is what actually prevents double booking.
    pub async fn ensure_slot_free(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: &str,
    ) -> Result<(), AppointmentError> {
        if let Some(existing) = self.find_slot_holder(doctor_id, date, time).await? {
            warn!(
                "Slot {} {} for doctor {} already held by appointment {}",
                date, time, doctor_id, existing.id
            );
            return Err(AppointmentError::SlotNotAvailable);
        }
        Ok(())
    }
}
