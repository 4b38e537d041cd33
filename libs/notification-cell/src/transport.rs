use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{error, info};

use shared_config::AppConfig;

use crate::models::{DeliveryReport, EmailMessage};

/// Delivers a single message. Failures are reported, never raised.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn deliver(&self, message: &EmailMessage) -> DeliveryReport;
}

/// Resend HTTP API.
pub struct ResendTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ResendTransport {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl EmailTransport for ResendTransport {
    async fn deliver(&self, message: &EmailMessage) -> DeliveryReport {
        let url = format!("{}/emails", self.base_url);

        let response = match self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Email Error: {}", e);
                return DeliveryReport::failed(e.to_string());
            }
        };

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let reason = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Email API returned {}", status));
            error!("Email Error ({}): {}", status, reason);
            return DeliveryReport::failed(reason);
        }

        info!("Email '{}' sent to {}", message.subject, message.to);
        DeliveryReport::sent(body)
    }
}

/// Used when no API key is configured: the message only goes to the log.
pub struct LogTransport;

#[async_trait]
impl EmailTransport for LogTransport {
    async fn deliver(&self, message: &EmailMessage) -> DeliveryReport {
        info!(
            to = %message.to,
            subject = %message.subject,
            "[MOCK EMAIL]\n{}",
            message.html
        );
        DeliveryReport::mock()
    }
}

pub fn transport_for(config: &AppConfig) -> Arc<dyn EmailTransport> {
    match config.resend_api_key.as_deref() {
        Some(key) if config.is_email_configured() => Arc::new(ResendTransport::new(&config.resend_base_url, key)),
        _ => Arc::new(LogTransport),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use wiremock::matchers::{body_json, header, method, path};

    fn message() -> EmailMessage {
        EmailMessage {
            from: "HealthCare Telemed <onboarding@resend.dev>".to_string(),
            to: "pat@example.com".to_string(),
            subject: "Hello".to_string(),
            html: "<p>hi</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn resend_posts_message_with_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test"))
            .and(body_json(json!({
                "from": "HealthCare Telemed <onboarding@resend.dev>",
                "to": "pat@example.com",
                "subject": "Hello",
                "html": "<p>hi</p>"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "email-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let report = ResendTransport::new(&server.uri(), "re_test").deliver(&message()).await;
        assert_eq!(report, DeliveryReport::sent(json!({"id": "email-1"})));
    }

    #[tokio::test]
    async fn resend_rejection_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "statusCode": 422,
                "message": "Invalid `to` field."
            })))
            .mount(&server)
            .await;

        let report = ResendTransport::new(&server.uri(), "re_test").deliver(&message()).await;
        assert!(!report.success);
        assert_eq!(report.error.as_deref(), Some("Invalid `to` field."));
    }

    #[tokio::test]
    async fn transport_follows_email_configuration() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_live"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "email-2"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = shared_utils::test_utils::TestConfig::with_mock_server(&server.uri()).to_app_config();
        assert!(!config.is_email_configured());
        assert_eq!(transport_for(&config).deliver(&message()).await, DeliveryReport::mock());

        config.resend_api_key = Some("re_live".to_string());
        assert_eq!(
            transport_for(&config).deliver(&message()).await,
            DeliveryReport::sent(json!({"id": "email-2"}))
        );
    }

    #[tokio::test]
    async fn log_transport_reports_mock_delivery() {
        assert_eq!(LogTransport.deliver(&message()).await, DeliveryReport::mock());
    }
}
