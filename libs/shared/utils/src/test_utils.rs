use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub service_role_key: String,
    pub cron_secret: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            service_role_key: "test-service-role-key".to_string(),
            cron_secret: "test-cron-secret".to_string(),
        }
    }
}

impl TestConfig {
    /// Points both the database and the email API at a mock server.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            supabase_url: uri.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_service_role_key: self.service_role_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            resend_api_key: None,
            resend_base_url: self.supabase_url.clone(),
            email_from: "HealthCare Telemed <onboarding@resend.dev>".to_string(),
            cron_secret: self.cron_secret.clone(),
            app_base_url: "http://localhost:3000".to_string(),
            video_base_url: "https://meet.jit.si".to_string(),
            prescriptions_bucket: "prescriptions".to_string(),
            server_port: 3000,
        }
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some("authenticated".to_string()),
            metadata: Some(json!({ "full_name": "Test User", "role": self.role })),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": "authenticated",
            "user_metadata": { "full_name": "Test User", "role": user.role },
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Row shapes as the hosted database returns them.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn profile_response(id: &str, role: &str, full_name: Option<&str>) -> serde_json::Value {
        json!({
            "id": id,
            "role": role,
            "full_name": full_name,
            "email": format!("{}@example.com", role),
            "specialization": if role == "doctor" { json!("Cardiology") } else { json!(null) },
            "consultation_price": if role == "doctor" { json!(50.0) } else { json!(null) },
            "bio": null
        })
    }

    pub fn availability_response(doctor_id: &str, day: &str, start: &str, end: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "day_of_week": day,
            "start_time": start,
            "end_time": end
        })
    }

    pub fn appointment_response(
        id: &str,
        patient_id: &str,
        doctor_id: &str,
        start_time: DateTime<Utc>,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "start_time": start_time.to_rfc3339(),
            "status": status,
            "reminder_24h_sent": false,
            "reminder_1h_sent": false
        })
    }

    pub fn medical_record_response(appointment_id: &str, doctor_id: &str, patient_id: &str, text: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "appointment_id": appointment_id,
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "diagnosis": "Viral Fever",
            "prescription_text": text,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "code": code,
            "message": message,
            "details": null,
            "hint": null
        })
    }
}
