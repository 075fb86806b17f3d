use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::records::{Appointment, AppointmentStatus, Doctor, Patient};

use crate::store::{AppointmentFilter, RecordStore, StoreError, StoreResult, UniqueField};

/// The persisted document: three top-level arrays of flat records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}

impl Dataset {
    pub fn email_taken(&self, email: &str) -> bool {
        self.patients.iter().any(|p| p.email.eq_ignore_ascii_case(email))
            || self.doctors.iter().any(|d| d.email.eq_ignore_ascii_case(email))
    }

    pub fn username_taken(&self, username: &str) -> bool {
        self.doctors.iter().any(|d| d.username == username)
    }

    pub fn slot_holder(&self, candidate: &Appointment) -> Option<&Appointment> {
        self.appointments
            .iter()
            .find(|apt| apt.holds_slot(candidate.doctor_id, candidate.date, &candidate.time))
    }
}

/// Record store backed by a single JSON file, rewritten wholesale on every
/// mutation.
///
/// The document is cached in memory. Writers hold the write lock across
/// check, apply and persist, so the uniqueness checks cannot race and a
/// failed write leaves the cached state untouched.
pub struct JsonFileStore {
    path: Option<PathBuf>,
    data: RwLock<Dataset>,
}

impl JsonFileStore {
    /// Open (or create) the store at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let data = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => {
                warn!("Data file {} is empty, starting with no records", path.display());
                Dataset::default()
            }
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Data file {} not found, creating it", path.display());
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                let empty = Dataset::default();
                write_document(&path, &empty).await?;
                empty
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            "Loaded {} patients, {} doctors, {} appointments from {}",
            data.patients.len(),
            data.doctors.len(),
            data.appointments.len(),
            path.display()
        );

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// A store with no backing file; contents vanish with the value.
    pub fn in_memory() -> Self {
        Self::with_dataset(Dataset::default())
    }

    pub fn with_dataset(data: Dataset) -> Self {
        Self {
            path: None,
            data: RwLock::new(data),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn snapshot(&self) -> Dataset {
        self.data.read().await.clone()
    }

    async fn persist(&self, data: &Dataset) -> StoreResult<()> {
        match &self.path {
            Some(path) => write_document(path, data).await,
            None => Ok(()),
        }
    }

    /// Apply `change` to a copy of the dataset, persist it, then publish it.
    async fn mutate<T, F>(&self, change: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Dataset) -> StoreResult<T> + Send,
        T: Send,
    {
        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        let output = change(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(output)
    }
}

async fn write_document(path: &Path, data: &Dataset) -> StoreResult<()> {
    let bytes = serde_json::to_vec_pretty(data)?;

    let mut tmp: OsString = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, &bytes).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
            warn!("Failed to remove {}: {}", tmp.display(), cleanup);
        }
        return Err(e.into());
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn patients(&self) -> StoreResult<Vec<Patient>> {
        Ok(self.data.read().await.patients.clone())
    }

    async fn doctors(&self) -> StoreResult<Vec<Doctor>> {
        Ok(self.data.read().await.doctors.clone())
    }

    async fn appointments(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        let data = self.data.read().await;
        Ok(data
            .appointments
            .iter()
            .filter(|apt| filter.matches(apt))
            .cloned()
            .collect())
    }

    async fn patient(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        let data = self.data.read().await;
        Ok(data.patients.iter().find(|p| p.id == id).cloned())
    }

    async fn doctor(&self, id: Uuid) -> StoreResult<Option<Doctor>> {
        let data = self.data.read().await;
        Ok(data.doctors.iter().find(|d| d.id == id).cloned())
    }

    async fn appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>> {
        let data = self.data.read().await;
        Ok(data.appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn patient_by_email(&self, email: &str) -> StoreResult<Option<Patient>> {
        let data = self.data.read().await;
        Ok(data
            .patients
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn doctor_by_username(&self, username: &str) -> StoreResult<Option<Doctor>> {
        let data = self.data.read().await;
        Ok(data.doctors.iter().find(|d| d.username == username).cloned())
    }

    async fn email_taken(&self, email: &str) -> StoreResult<bool> {
        Ok(self.data.read().await.email_taken(email))
    }

    async fn insert_patient(&self, patient: Patient) -> StoreResult<Patient> {
        self.mutate(move |data| {
            if data.email_taken(&patient.email) {
                return Err(StoreError::Duplicate { field: UniqueField::Email });
            }
            data.patients.push(patient.clone());
            Ok(patient)
        })
        .await
    }

    async fn insert_doctor(&self, doctor: Doctor) -> StoreResult<Doctor> {
        self.mutate(move |data| {
            if data.email_taken(&doctor.email) {
                return Err(StoreError::Duplicate { field: UniqueField::Email });
            }
            if data.username_taken(&doctor.username) {
                return Err(StoreError::Duplicate { field: UniqueField::Username });
            }
            data.doctors.push(doctor.clone());
            Ok(doctor)
        })
        .await
    }

    async fn insert_appointment(&self, appointment: Appointment) -> StoreResult<Appointment> {
        self.mutate(move |data| {
            if appointment.is_upcoming() && data.slot_holder(&appointment).is_some() {
                return Err(StoreError::SlotTaken {
                    doctor_id: appointment.doctor_id,
                    date: appointment.date,
                    time: appointment.time.clone(),
                });
            }
            data.appointments.push(appointment.clone());
            Ok(appointment)
        })
        .await
    }

    async fn set_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> StoreResult<Option<Appointment>> {
        let mut guard = self.data.write().await;

        let Some(index) = guard.appointments.iter().position(|a| a.id == id) else {
            return Ok(None);
        };

        if guard.appointments[index].status == status {
            return Ok(Some(guard.appointments[index].clone()));
        }

        let mut next = guard.clone();
        next.appointments[index].status = status;
        self.persist(&next).await?;

        let updated = next.appointments[index].clone();
        *guard = next;
        Ok(Some(updated))
    }
}
