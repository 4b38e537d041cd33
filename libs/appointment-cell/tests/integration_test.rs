use std::sync::Arc;
use std::time::Duration as StdDuration;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use futures::StreamExt;
use tower::ServiceExt;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_json, header, method, path, query_param};

use appointment_cell::router::appointment_routes;
use appointment_cell::models::{AppointmentStatus, AppointmentUpdate};
use appointment_cell::AppointmentUpdates;
use shared_config::AppConfig;
use shared_utils::test_utils::{TestConfig, TestUser, JwtTestUtils, MockSupabaseResponses};

fn create_test_app(config: AppConfig) -> Router {
    appointment_routes(Arc::new(config), AppointmentUpdates::default())
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token));

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn mount_caller_profile(server: &MockServer, user: &TestUser, full_name: Option<&str>) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{}", user.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::profile_response(&user.id, &user.role, full_name)
        ])))
        .mount(server)
        .await;
}

async fn mount_doctor_lookup(server: &MockServer, doctor_id: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .and(query_param("role", "eq.doctor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::profile_response(doctor_id, "doctor", Some("House"))
        ])))
        .mount(server)
        .await;
}

fn tomorrow() -> NaiveDate {
    (Utc::now() + Duration::days(1)).date_naive()
}

#[tokio::test]
async fn test_booking_calls_database_function() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, Some(1));
    let doctor_id = Uuid::new_v4().to_string();
    let date = tomorrow();
    mount_doctor_lookup(&mock_server, &doctor_id).await;

    let expected_start = Utc.from_utc_datetime(&date.and_hms_opt(14, 0, 0).unwrap());

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/book_appointment"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .and(body_json(json!({
            "p_patient_id": patient.id,
            "p_doctor_id": doctor_id,
            "p_start_time": expected_start.to_rfc3339()
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = create_test_app(config)
        .oneshot(authed("POST", "/", &token, Some(json!({
            "doctor_id": doctor_id,
            "date": date,
            "slot": "14:00"
        }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
async fn test_booking_overlap_is_conflict() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, Some(1));
    let doctor_id = Uuid::new_v4().to_string();
    mount_doctor_lookup(&mock_server, &doctor_id).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/book_appointment"))
        .respond_with(ResponseTemplate::new(409).set_body_json(MockSupabaseResponses::error_response(
            "conflicting key value violates exclusion constraint \"no_double_booking\"",
            "23P01",
        )))
        .mount(&mock_server)
        .await;

    let response = create_test_app(config)
        .oneshot(authed("POST", "/", &token, Some(json!({
            "doctor_id": doctor_id,
            "date": tomorrow(),
            "slot": "10:00",
            "utc_offset_minutes": 60
        }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("conflicting key value"));
}

#[tokio::test]
async fn test_booking_in_the_past_is_rejected() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, Some(1));
    let doctor_id = Uuid::new_v4().to_string();
    mount_doctor_lookup(&mock_server, &doctor_id).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/book_appointment"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = create_test_app(config)
        .oneshot(authed("POST", "/", &token, Some(json!({
            "doctor_id": doctor_id,
            "date": (Utc::now() - Duration::days(2)).date_naive(),
            "slot": "10:00"
        }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patient_dashboard_merges_doctors() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, Some(1));
    let doctor_id = Uuid::new_v4().to_string();
    let gone_doctor = Uuid::new_v4().to_string();
    mount_caller_profile(&mock_server, &patient, Some("Pat")).await;

    let start = Utc::now() + Duration::days(3);
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("patient_id", format!("eq.{}", patient.id)))
        .and(query_param("order", "start_time.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(&Uuid::new_v4().to_string(), &patient.id, &doctor_id, start, "confirmed"),
            MockSupabaseResponses::appointment_response(&Uuid::new_v4().to_string(), &patient.id, &gone_doctor, start + Duration::hours(2), "pending"),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("select", "id,role,full_name,email,specialization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::profile_response(&doctor_id, "doctor", Some("Dr. House"))
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = create_test_app(config)
        .oneshot(authed("GET", "/mine", &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["role"], "patient");
    assert_eq!(body["total"], 2);

    let first = &body["appointments"][0];
    assert_eq!(first["doctor"]["full_name"], "Dr. House");
    assert_eq!(first["doctor"]["specialization"], "Cardiology");
    assert_eq!(first["can_join"], true);
    assert!(first["display_time"].as_str().unwrap().contains(" at "));

    let second = &body["appointments"][1];
    assert_eq!(second["doctor"]["full_name"], "Unknown Doctor");
    assert_eq!(second["doctor"]["specialization"], "General");
    assert_eq!(second["can_join"], false);
}

#[tokio::test]
async fn test_doctor_dashboard_names_patients() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let doctor = TestUser::doctor("doctor@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(1));
    let patient_id = Uuid::new_v4().to_string();
    mount_caller_profile(&mock_server, &doctor, Some("Dr. Test")).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", doctor.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(&Uuid::new_v4().to_string(), &patient_id, &doctor.id, Utc::now(), "pending"),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("in.({})", patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::profile_response(&patient_id, "patient", None)
        ])))
        .mount(&mock_server)
        .await;

    let response = create_test_app(config)
        .oneshot(authed("GET", "/mine", &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["role"], "doctor");
    assert_eq!(body["appointments"][0]["patient_name"], "patient@example.com");
}

#[tokio::test]
async fn test_detail_falls_back_to_unknown_patient() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let doctor = TestUser::doctor("doctor@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(1));
    let appointment_id = Uuid::new_v4().to_string();
    let patient_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(&appointment_id, &patient_id, &doctor.id, Utc::now(), "confirmed"),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{}", patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let response = create_test_app(config)
        .oneshot(authed("GET", &format!("/{}", appointment_id), &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["id"], appointment_id);
    assert_eq!(body["patient"]["full_name"], "Unknown Patient");
}

#[tokio::test]
async fn test_detail_not_visible_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let response = create_test_app(config)
        .oneshot(authed("GET", &format!("/{}", Uuid::new_v4()), &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_assigned_doctor_confirms_and_update_is_published() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let doctor = TestUser::doctor("doctor@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(1));
    let appointment_id = Uuid::new_v4().to_string();
    let patient_id = Uuid::new_v4().to_string();
    let start = Utc::now() + Duration::days(1);

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(&appointment_id, &patient_id, &doctor.id, start, "pending"),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "eq.pending"))
        .and(body_json(json!({ "status": "confirmed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(&appointment_id, &patient_id, &doctor.id, start, "confirmed"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let updates = AppointmentUpdates::default();
    let mut receiver = updates.subscribe();
    let app = appointment_routes(Arc::new(config), updates);

    let response = app
        .oneshot(authed("PATCH", &format!("/{}/status", appointment_id), &token, Some(json!({ "status": "confirmed" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "confirmed");

    let update = receiver.recv().await.unwrap();
    assert_eq!(update.id.to_string(), appointment_id);
    assert_eq!(update.status, AppointmentStatus::Confirmed);
}

#[tokio::test]
async fn test_patient_cannot_change_status() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, Some(1));
    let appointment_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(&appointment_id, &patient.id, &Uuid::new_v4().to_string(), Utc::now(), "pending"),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = create_test_app(config)
        .oneshot(authed("PATCH", &format!("/{}/status", appointment_id), &token, Some(json!({ "status": "cancelled" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_transition_is_bad_request() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let doctor = TestUser::doctor("doctor@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(1));
    let appointment_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(&appointment_id, &Uuid::new_v4().to_string(), &doctor.id, Utc::now(), "cancelled"),
        ])))
        .mount(&mock_server)
        .await;

    let response = create_test_app(config)
        .oneshot(authed("PATCH", &format!("/{}/status", appointment_id), &token, Some(json!({ "status": "confirmed" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "Cannot change status from cancelled to confirmed");
}

#[tokio::test]
async fn test_stream_delivers_only_callers_updates() {
    let config = TestConfig::default().to_app_config();
    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, Some(1));
    let patient_id = Uuid::parse_str(&patient.id).unwrap();

    let updates = AppointmentUpdates::default();
    let app = appointment_routes(Arc::new(config), updates.clone());

    let response = app.oneshot(authed("GET", "/stream", &token, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    let unrelated = AppointmentUpdate {
        id: Uuid::new_v4(),
        status: AppointmentStatus::Confirmed,
        patient_id: Uuid::new_v4(),
        doctor_id: Uuid::new_v4(),
    };
    let mine = AppointmentUpdate {
        id: Uuid::new_v4(),
        status: AppointmentStatus::Cancelled,
        patient_id,
        doctor_id: Uuid::new_v4(),
    };
    updates.publish(unrelated.clone());
    updates.publish(mine.clone());

    let mut body = response.into_body().into_data_stream();
    let frame = tokio::time::timeout(StdDuration::from_secs(5), body.next())
        .await
        .expect("no event within timeout")
        .unwrap()
        .unwrap();
    let text = String::from_utf8(frame.to_vec()).unwrap();

    assert!(text.contains("event: appointment"));
    assert!(text.contains(&mine.id.to_string()));
    assert!(text.contains("cancelled"));
    assert!(!text.contains(&unrelated.id.to_string()));
}

#[tokio::test]
async fn test_routes_require_authentication() {
    let app = create_test_app(TestConfig::default().to_app_config());

    let request = Request::builder().uri("/mine").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
