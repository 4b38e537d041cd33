use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use chrono::Utc;
use tracing::info;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::time::format_locale_timestamp_str;

use crate::models::{DeliveryReport, NotificationError, ReminderSummary, SendEmailRequest};
use crate::services::{EmailService, ReminderService};

/// Booking confirmation requested by a client. The delivery outcome is
/// returned as-is, including failures.
#[axum::debug_handler]
pub async fn send_email(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<SendEmailRequest>,
) -> Result<Json<DeliveryReport>, AppError> {
    let (to, patient_name, time) = request.required_fields()?;
    let doctor_name = request.doctor_name.as_deref().unwrap_or_default();

    let report = EmailService::new(&state)
        .send_confirmation(to, patient_name, doctor_name, &format_locale_timestamp_str(time))
        .await;

    Ok(Json(report))
}

/// Requires `Authorization: Bearer {CRON_SECRET}`; an unset secret locks
/// the endpoint.
fn authorize_cron(headers: &HeaderMap, secret: &str) -> Result<(), NotificationError> {
    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if secret.is_empty() || provided != format!("Bearer {}", secret) {
        return Err(NotificationError::Unauthorized);
    }

    Ok(())
}

#[axum::debug_handler]
pub async fn run_reminders(
    State(state): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<ReminderSummary>, AppError> {
    let service = ReminderService::new(&state, EmailService::new(&state))?;
    authorize_cron(&headers, &state.cron_secret)?;

    info!("Running appointment reminder job");
    let summary = service.run(Utc::now()).await?;

    Ok(Json(summary))
}
