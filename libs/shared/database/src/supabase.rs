use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::records::{Appointment, AppointmentStatus, Doctor, Patient};

use crate::store::{AppointmentFilter, RecordStore, StoreError, StoreResult, UniqueField};

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self) -> StoreResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.anon_key))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> StoreResult<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> StoreResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            if status == StatusCode::CONFLICT {
                warn!("Remote store rejected write ({}): {}", status, error_text);
            } else {
                error!("API error ({}): {}", status, error_text);
            }

            return Err(StoreError::Remote {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }
}

/// Record store over Supabase tables `patients`, `doctors` and `appointments`,
/// whose columns are named like the record fields.
///
/// Uniqueness is pre-checked and backed by unique indexes on the remote side
/// (a partial index on `doctorId, date, time` where `status = 'upcoming'`);
/// an HTTP 409 from an insert maps to the same error as a failed pre-check.
pub struct SupabaseStore {
    supabase: SupabaseClient,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    fn representation_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    async fn fetch_first<T: DeserializeOwned>(&self, path: &str) -> StoreResult<Option<T>> {
        let rows: Vec<T> = self.supabase.request(Method::GET, path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_row<T>(&self, table: &str, record: &T) -> StoreResult<T>
    where
        T: serde::Serialize + DeserializeOwned,
    {
        let rows: Vec<T> = self
            .supabase
            .request_with_headers(
                Method::POST,
                &format!("/rest/v1/{}", table),
                Some(serde_json::to_value(record)?),
                Some(Self::representation_headers()),
            )
            .await?;

        rows.into_iter().next().ok_or_else(|| StoreError::Remote {
            status: 200,
            body: format!("insert into {} returned no rows", table),
        })
    }

    fn appointments_path(filter: &AppointmentFilter) -> String {
        let mut query_parts = vec![];

        if let Some(patient_id) = filter.patient_id {
            query_parts.push(format!("patientId=eq.{}", patient_id));
        }
        if let Some(doctor_id) = filter.doctor_id {
            query_parts.push(format!("doctorId=eq.{}", doctor_id));
        }
        if let Some(status) = filter.status {
            query_parts.push(format!("status=eq.{}", status));
        }

        if query_parts.is_empty() {
            "/rest/v1/appointments".to_string()
        } else {
            format!("/rest/v1/appointments?{}", query_parts.join("&"))
        }
    }
}

fn is_conflict(err: &StoreError) -> Option<&str> {
    match err {
        StoreError::Remote { status: 409, body } => Some(body.as_str()),
        _ => None,
    }
}

#[async_trait]
impl RecordStore for SupabaseStore {
    async fn patients(&self) -> StoreResult<Vec<Patient>> {
        self.supabase.request(Method::GET, "/rest/v1/patients", None).await
    }

    async fn doctors(&self) -> StoreResult<Vec<Doctor>> {
        self.supabase.request(Method::GET, "/rest/v1/doctors", None).await
    }

    async fn appointments(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        let path = Self::appointments_path(filter);
        self.supabase.request(Method::GET, &path, None).await
    }

    async fn patient(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        self.fetch_first(&format!("/rest/v1/patients?id=eq.{}", id)).await
    }

    async fn doctor(&self, id: Uuid) -> StoreResult<Option<Doctor>> {
        self.fetch_first(&format!("/rest/v1/doctors?id=eq.{}", id)).await
    }

    async fn appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>> {
        self.fetch_first(&format!("/rest/v1/appointments?id=eq.{}", id)).await
    }

    async fn patient_by_email(&self, email: &str) -> StoreResult<Option<Patient>> {
        let path = format!("/rest/v1/patients?email=eq.{}", urlencoding::encode(email));
        self.fetch_first(&path).await
    }

    async fn doctor_by_username(&self, username: &str) -> StoreResult<Option<Doctor>> {
        let path = format!("/rest/v1/doctors?username=eq.{}", urlencoding::encode(username));
        self.fetch_first(&path).await
    }

    async fn email_taken(&self, email: &str) -> StoreResult<bool> {
        let encoded = urlencoding::encode(email);

        let patients: Vec<Value> = self
            .supabase
            .request(Method::GET, &format!("/rest/v1/patients?email=eq.{}&select=id", encoded), None)
            .await?;
        if !patients.is_empty() {
            return Ok(true);
        }

        let doctors: Vec<Value> = self
            .supabase
            .request(Method::GET, &format!("/rest/v1/doctors?email=eq.{}&select=id", encoded), None)
            .await?;
        Ok(!doctors.is_empty())
    }

    async fn insert_patient(&self, patient: Patient) -> StoreResult<Patient> {
        if self.email_taken(&patient.email).await? {
            return Err(StoreError::Duplicate { field: UniqueField::Email });
        }

        self.insert_row("patients", &patient).await.map_err(|e| match is_conflict(&e) {
            Some(_) => StoreError::Duplicate { field: UniqueField::Email },
            None => e,
        })
    }

    async fn insert_doctor(&self, doctor: Doctor) -> StoreResult<Doctor> {
        if self.email_taken(&doctor.email).await? {
            return Err(StoreError::Duplicate { field: UniqueField::Email });
        }
        if self.doctor_by_username(&doctor.username).await?.is_some() {
            return Err(StoreError::Duplicate { field: UniqueField::Username });
        }

        self.insert_row("doctors", &doctor).await.map_err(|e| match is_conflict(&e) {
            Some(body) if body.contains("username") => StoreError::Duplicate { field: UniqueField::Username },
            Some(_) => StoreError::Duplicate { field: UniqueField::Email },
            None => e,
        })
    }

    async fn insert_appointment(&self, appointment: Appointment) -> StoreResult<Appointment> {
        let slot_taken = || StoreError::SlotTaken {
            doctor_id: appointment.doctor_id,
            date: appointment.date,
            time: appointment.time.clone(),
        };

        if appointment.is_upcoming() {
            let path = format!(
                "/rest/v1/appointments?doctorId=eq.{}&date=eq.{}&time=eq.{}&status=eq.{}&select=id",
                appointment.doctor_id,
                appointment.date,
                urlencoding::encode(&appointment.time),
                AppointmentStatus::Upcoming,
            );
            let holders: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;
            if !holders.is_empty() {
                return Err(slot_taken());
            }
        }

        self.insert_row("appointments", &appointment).await.map_err(|e| match is_conflict(&e) {
            Some(_) => slot_taken(),
            None => e,
        })
    }

    async fn set_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> StoreResult<Option<Appointment>> {
        let rows: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &format!("/rest/v1/appointments?id=eq.{}", id),
                Some(json!({ "status": status })),
                Some(Self::representation_headers()),
            )
            .await?;

        Ok(rows.into_iter().next())
    }
}
