use axum::{
    body::Body,
    http::{header::LOCATION, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use dashboard_cell::create_dashboard_router;
use shared_database::RecordStore;
use shared_models::records::{Doctor, Patient, Role};
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestRecords, TestUser};
use shared_utils::AppState;

async fn seeded() -> (Router, std::sync::Arc<AppState>, Patient, Doctor) {
    let state = TestConfig::default().to_state();
    let patient = state
        .store
        .insert_patient(TestRecords::patient("Jane Doe", "jane@x.com"))
        .await
        .unwrap();
    let doctor = state
        .store
        .insert_doctor(TestRecords::doctor("Gregory House", "house", "Cardiology"))
        .await
        .unwrap();
    state
        .store
        .insert_appointment(TestRecords::appointment(&patient, &doctor, "2025-03-01", "10:00"))
        .await
        .unwrap();

    (create_dashboard_router(state.clone()), state, patient, doctor)
}

async fn get(app: &Router, uri: &str, bearer: &str) -> (StatusCode, Option<String>, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", bearer)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let location = response
        .headers()
        .get(LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, location, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_dashboard_info_for_session() {
    let (app, state, _, doctor) = seeded().await;
    let bearer = JwtTestUtils::bearer(&TestUser::with_id(doctor.id, Role::Doctor), &state.config);

    let (status, _, body) = get(&app, "/", &bearer).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "doctor");
    assert_eq!(body["path"], "/dashboard/doctor");
    assert_eq!(body["navigation"][1]["label"], "My Schedule");
}

#[tokio::test]
async fn test_cross_role_dashboard_redirects() {
    let (app, state, patient, _) = seeded().await;
    let bearer = JwtTestUtils::bearer(&TestUser::with_id(patient.id, Role::Patient), &state.config);

    for view in ["admin", "doctor", "settings"] {
        let (status, location, _) = get(&app, &format!("/{}", view), &bearer).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/dashboard/patient"));
    }
}

#[tokio::test]
async fn test_own_dashboards_render() {
    let (app, state, patient, doctor) = seeded().await;

    let as_patient = JwtTestUtils::bearer(&TestUser::with_id(patient.id, Role::Patient), &state.config);
    let (status, _, body) = get(&app, "/patient", &as_patient).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["upcoming"].as_array().unwrap().len(), 1);
    assert_eq!(body["doctors"][0]["fullName"], "Gregory House");

    let as_doctor = JwtTestUtils::bearer(&TestUser::with_id(doctor.id, Role::Doctor), &state.config);
    let (status, _, body) = get(&app, "/doctor", &as_doctor).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["upcomingCount"], 1);
    assert_eq!(body["appointments"][0]["patientName"], "Jane Doe");

    let as_admin = JwtTestUtils::bearer(&TestUser::admin(), &state.config);
    let (status, _, body) = get(&app, "/admin", &as_admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totals"]["patients"], 1);
    assert_eq!(body["totals"]["upcomingAppointments"], 1);
    assert!(body["patients"][0].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_dashboard_requires_session() {
    let (app, _, _, _) = seeded().await;

    let request = Request::builder().method("GET").uri("/patient").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
