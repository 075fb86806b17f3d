use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::{AppConfig, StoreBackend};
use shared_database::{AppointmentFilter, RecordStore, StoreError, SupabaseStore, UniqueField};
use shared_models::records::{Appointment, AppointmentStatus, Patient, Role};

fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        store_backend: StoreBackend::Supabase,
        supabase_url: server.uri(),
        supabase_anon_key: "test-anon-key".to_string(),
        ..AppConfig::default()
    }
}

fn appointment(doctor_id: Uuid) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        doctor_id,
        patient_name: "Jane Doe".to_string(),
        doctor_name: "Dr. House".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        time: "10:00".to_string(),
        status: AppointmentStatus::Upcoming,
    }
}

#[tokio::test]
async fn test_list_appointments_sends_owner_filter() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let existing = appointment(doctor_id);

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctorId", format!("eq.{}", doctor_id)))
        .and(header("apikey", "test-anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([existing])))
        .expect(1)
        .mount(&server)
        .await;

    let store = SupabaseStore::new(&config_for(&server));
    let found = store
        .appointments(&AppointmentFilter::by_doctor(doctor_id))
        .await
        .unwrap();

    assert_eq!(found, vec![existing]);
}

#[tokio::test]
async fn test_insert_appointment_rejects_held_slot() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "eq.upcoming"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": Uuid::new_v4() }])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let store = SupabaseStore::new(&config_for(&server));
    let result = store.insert_appointment(appointment(doctor_id)).await;

    assert_matches!(result, Err(StoreError::SlotTaken { .. }));
}

#[tokio::test]
async fn test_insert_appointment_maps_unique_violation_to_slot_taken() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(header("Prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"appointments_upcoming_slot\""
        })))
        .mount(&server)
        .await;

    let store = SupabaseStore::new(&config_for(&server));
    let result = store.insert_appointment(appointment(Uuid::new_v4())).await;

    assert_matches!(result, Err(StoreError::SlotTaken { .. }));
}

#[tokio::test]
async fn test_insert_patient_returns_representation() {
    let server = MockServer::start().await;
    let patient = Patient {
        id: Uuid::new_v4(),
        full_name: "Jane Doe".to_string(),
        email: "jane@x.com".to_string(),
        password_hash: "hash".to_string(),
        role: Role::Patient,
    };

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .and(body_json(json!(patient)))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([patient])))
        .mount(&server)
        .await;

    let store = SupabaseStore::new(&config_for(&server));
    let created = store.insert_patient(patient.clone()).await.unwrap();
    assert_eq!(created, patient);
}

#[tokio::test]
async fn test_insert_patient_with_taken_email_is_duplicate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("email", "eq.jane@x.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": Uuid::new_v4() }])))
        .mount(&server)
        .await;

    let store = SupabaseStore::new(&config_for(&server));
    let result = store
        .insert_patient(Patient {
            id: Uuid::new_v4(),
            full_name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Patient,
        })
        .await;

    assert_matches!(result, Err(StoreError::Duplicate { field: UniqueField::Email }));
}

#[tokio::test]
async fn test_set_status_patches_single_field() {
    let server = MockServer::start().await;
    let mut updated = appointment(Uuid::new_v4());
    updated.status = AppointmentStatus::Canceled;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", updated.id)))
        .and(body_json(json!({ "status": "canceled" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([updated])))
        .mount(&server)
        .await;

    let store = SupabaseStore::new(&config_for(&server));
    let result = store
        .set_appointment_status(updated.id, AppointmentStatus::Canceled)
        .await
        .unwrap();

    assert_eq!(result, Some(updated));
}

#[tokio::test]
async fn test_server_error_is_remote_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let store = SupabaseStore::new(&config_for(&server));
    assert_matches!(
        store.doctors().await,
        Err(StoreError::Remote { status: 503, body }) if body == "unavailable"
    );
}
