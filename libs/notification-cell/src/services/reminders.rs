use anyhow::anyhow;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::rest::encode_timestamp;
use shared_database::supabase::SupabaseClient;
use shared_utils::time::format_locale_timestamp;

use crate::models::{NotificationError, ReminderCandidate, ReminderSummary, ReminderWindow};
use crate::services::email::EmailService;

/// Confirmed appointments in the window whose reminder flag is still unset,
/// with the patient's contact details embedded.
fn due_path(window: ReminderWindow, now: DateTime<Utc>) -> String {
    let (from, to) = window.range(now);
    format!(
        "/rest/v1/appointments?select=*,patient:profiles!patient_id(email,full_name)\
         &status=eq.confirmed&{}=is.false&start_time=gte.{}&start_time=lte.{}",
        window.flag_column(),
        encode_timestamp(from),
        encode_timestamp(to),
    )
}

/// Cron pass that emails patients 24 hours and 1 hour before confirmed
/// appointments and flags each appointment once its reminder went out.
pub struct ReminderService {
    supabase: SupabaseClient,
    email: EmailService,
}

impl ReminderService {
    /// Fails with `Configuration` when the service-role credentials are absent.
    pub fn new(config: &AppConfig, email: EmailService) -> Result<Self, NotificationError> {
        if !config.is_admin_configured() {
            return Err(NotificationError::Configuration);
        }

        Ok(Self {
            supabase: SupabaseClient::service_role(config),
            email,
        })
    }

    pub async fn run(&self, now: DateTime<Utc>) -> Result<ReminderSummary, NotificationError> {
        // Both windows are queried before anything is sent.
        let day_before = self.due(ReminderWindow::DayBefore, now).await?;
        let hour_before = self.due(ReminderWindow::HourBefore, now).await?;

        let sent_24h = self.process(ReminderWindow::DayBefore, &day_before).await?;
        let sent_1h = self.process(ReminderWindow::HourBefore, &hour_before).await?;

        info!("Reminder job finished: {} day-before, {} hour-before", sent_24h, sent_1h);

        Ok(ReminderSummary {
            success: true,
            sent_24h,
            sent_1h,
        })
    }

    async fn due(
        &self,
        window: ReminderWindow,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReminderCandidate>, NotificationError> {
        let path = due_path(window, now);
        let candidates: Vec<ReminderCandidate> = self.supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(NotificationError::Query)?;

        debug!("{} appointments due for {}", candidates.len(), window.subject());
        Ok(candidates)
    }

    async fn process(
        &self,
        window: ReminderWindow,
        candidates: &[ReminderCandidate],
    ) -> Result<usize, NotificationError> {
        let mut sent = 0;

        for appointment in candidates {
            let patient = appointment.patient.as_ref();
            let Some(email) = patient.and_then(|p| p.email.as_deref()).filter(|e| !e.is_empty()) else {
                warn!("Appointment {} has no patient email, skipping {}", appointment.id, window.subject());
                continue;
            };
            let name = patient
                .and_then(|p| p.full_name.as_deref())
                .filter(|n| !n.is_empty())
                .unwrap_or("Patient");

            let report = self.email
                .send_reminder(email, name, &format_locale_timestamp(&appointment.start_time), window)
                .await;
            if !report.success {
                let reason = report.error.unwrap_or_else(|| "unknown delivery error".to_string());
                return Err(NotificationError::Processing(anyhow!(
                    "reminder for appointment {} not delivered: {}",
                    appointment.id,
                    reason
                )));
            }

            self.mark_sent(window, &appointment.id.to_string()).await?;
            sent += 1;
        }

        Ok(sent)
    }

    async fn mark_sent(&self, window: ReminderWindow, appointment_id: &str) -> Result<(), NotificationError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut update = Map::new();
        update.insert(window.flag_column().to_string(), Value::Bool(true));

        let _: Value = self.supabase
            .request(Method::PATCH, &path, None, Some(Value::Object(update)))
            .await
            .map_err(NotificationError::Processing)?;

        Ok(())
    }
}
