use std::sync::Arc;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use tower::ServiceExt;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{header, method, path, query_param};

use video_conferencing_cell::router::video_conferencing_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{TestConfig, TestUser, JwtTestUtils, MockSupabaseResponses};

fn create_test_app(config: AppConfig) -> Router {
    video_conferencing_routes(Arc::new(config))
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn room_request(appointment_id: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/appointments/{}/room", appointment_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn mount_appointment(server: &MockServer, appointment_id: &str, patient_id: &str, doctor_id: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(appointment_id, patient_id, doctor_id, Utc::now(), "confirmed")
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_patient_gets_embed_url() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, Some(1));
    let appointment_id = Uuid::new_v4().to_string();
    mount_appointment(&mock_server, &appointment_id, &patient.id, &Uuid::new_v4().to_string()).await;

    let response = create_test_app(config).oneshot(room_request(&appointment_id, &token)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["room_name"], format!("telemed-room-{}", appointment_id));
    assert_eq!(
        body["embed_url"],
        format!("https://meet.jit.si/telemed-room-{}?config.prejoinPageEnabled=false", appointment_id)
    );
    assert_eq!(body["allow"], "camera *; microphone *; fullscreen; display-capture");
    assert_eq!(body["status"], "confirmed");
}

#[tokio::test]
async fn test_doctor_uses_configured_provider() {
    let mock_server = MockServer::start().await;
    let mut config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    config.video_base_url = "https://video.example.org".to_string();
    let doctor = TestUser::doctor("doctor@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(1));
    let appointment_id = Uuid::new_v4().to_string();
    mount_appointment(&mock_server, &appointment_id, &Uuid::new_v4().to_string(), &doctor.id).await;

    let response = create_test_app(config).oneshot(room_request(&appointment_id, &token)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(body["embed_url"].as_str().unwrap().starts_with("https://video.example.org/telemed-room-"));
}

#[tokio::test]
async fn test_stranger_is_forbidden() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let stranger = TestUser::patient("stranger@example.com");
    let token = JwtTestUtils::create_test_token(&stranger, &config.supabase_jwt_secret, Some(1));
    let appointment_id = Uuid::new_v4().to_string();
    mount_appointment(&mock_server, &appointment_id, &Uuid::new_v4().to_string(), &Uuid::new_v4().to_string()).await;

    let response = create_test_app(config).oneshot(room_request(&appointment_id, &token)).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(read_json(response).await["error"], "You are not a participant of this appointment");
}

#[tokio::test]
async fn test_lookup_uses_callers_token() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = create_test_app(config)
        .oneshot(room_request(&Uuid::new_v4().to_string(), &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
