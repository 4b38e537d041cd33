use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use shared_models::error::AppError;

/// An outgoing email as the delivery API expects it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outcome of one delivery attempt. Serialized as the send endpoint's
/// response: `{success, type}` for logged mail, `{success, data}` when the
/// provider accepted it and `{success, error}` on failure.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeliveryReport {
    pub success: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryReport {
    pub fn mock() -> Self {
        Self { success: true, kind: Some("mock".to_string()), data: None, error: None }
    }

    pub fn sent(data: Value) -> Self {
        Self { success: true, kind: None, data: Some(data), error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, kind: None, data: None, error: Some(error.into()) }
    }
}

/// Body of `POST /api/emails/send`. Fields are optional so that a missing
/// field is reported as such rather than as a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

/// Missing and empty values are absent; anything else passes through as sent.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

impl SendEmailRequest {
    /// Returns `(to, patient_name, time)`.
    pub fn required_fields(&self) -> Result<(&str, &str, &str), NotificationError> {
        match (present(&self.to), present(&self.patient_name), present(&self.time)) {
            (Some(to), Some(patient), Some(time)) => Ok((to, patient, time)),
            _ => Err(NotificationError::MissingFields),
        }
    }
}

/// The two reminder passes of the cron job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderWindow {
    DayBefore,
    HourBefore,
}

impl ReminderWindow {
    /// Width of the match window on either side of the target time.
    pub const TOLERANCE_MINUTES: i64 = 15;

    pub fn lead_hours(self) -> i64 {
        match self {
            ReminderWindow::DayBefore => 24,
            ReminderWindow::HourBefore => 1,
        }
    }

    pub fn flag_column(self) -> &'static str {
        match self {
            ReminderWindow::DayBefore => "reminder_24h_sent",
            ReminderWindow::HourBefore => "reminder_1h_sent",
        }
    }

    pub fn subject(self) -> &'static str {
        match self {
            ReminderWindow::DayBefore => "Appointment Reminder (24h)",
            ReminderWindow::HourBefore => "Appointment Reminder (1h)",
        }
    }

    /// Inclusive `[from, to]` range of start times due for this reminder.
    pub fn range(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let target = now + chrono::Duration::hours(self.lead_hours());
        let tolerance = chrono::Duration::minutes(Self::TOLERANCE_MINUTES);
        (target - tolerance, target + tolerance)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReminderPatient {
    pub email: Option<String>,
    pub full_name: Option<String>,
}

/// A confirmed appointment with its patient embedded.
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderCandidate {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub patient: Option<ReminderPatient>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ReminderSummary {
    pub success: bool,
    pub sent_24h: usize,
    pub sent_1h: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Missing fields")]
    MissingFields,

    #[error("Configuration error")]
    Configuration,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database query failed")]
    Query(#[source] anyhow::Error),

    #[error("Processing failed")]
    Processing(#[source] anyhow::Error),
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match &err {
            NotificationError::MissingFields => AppError::BadRequest(err.to_string()),
            NotificationError::Unauthorized => AppError::Auth(err.to_string()),
            NotificationError::Configuration => AppError::Internal(err.to_string()),
            NotificationError::Query(cause) | NotificationError::Processing(cause) => {
                tracing::error!("Reminder job failed: {:#}", cause);
                AppError::Internal(err.to_string())
            }
        }
    }
}
