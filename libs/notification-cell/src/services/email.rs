use std::sync::Arc;

use tracing::debug;

use shared_config::AppConfig;

use crate::models::{DeliveryReport, EmailMessage, ReminderWindow};
use crate::templates::{confirmation_email, reminder_email};
use crate::transport::{transport_for, EmailTransport};

pub const CONFIRMATION_SUBJECT: &str = "Appointment Confirmation - HealthCare Telemed";

/// Renders patient emails and hands them to the configured transport.
#[derive(Clone)]
pub struct EmailService {
    transport: Arc<dyn EmailTransport>,
    from: String,
    dashboard_url: String,
}

impl EmailService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_transport(config, transport_for(config))
    }

    pub fn with_transport(config: &AppConfig, transport: Arc<dyn EmailTransport>) -> Self {
        Self {
            transport,
            from: config.email_from.clone(),
            dashboard_url: config.dashboard_url(),
        }
    }

    pub async fn send_confirmation(
        &self,
        to: &str,
        patient_name: &str,
        doctor_name: &str,
        time: &str,
    ) -> DeliveryReport {
        debug!("Sending booking confirmation to {}", to);

        let html = confirmation_email(patient_name, doctor_name, time, &self.dashboard_url);
        self.send(to, CONFIRMATION_SUBJECT, html).await
    }

    pub async fn send_reminder(
        &self,
        to: &str,
        patient_name: &str,
        time: &str,
        window: ReminderWindow,
    ) -> DeliveryReport {
        debug!("Sending {} to {}", window.subject(), to);

        let html = reminder_email(patient_name, time, &self.dashboard_url);
        self.send(to, window.subject(), html).await
    }

    async fn send(&self, to: &str, subject: &str, html: String) -> DeliveryReport {
        let message = EmailMessage {
            from: self.from.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            html,
        };

        self.transport.deliver(&message).await
    }
}
