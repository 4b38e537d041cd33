// libs/appointment-cell/src/services/lifecycle.rs
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, AppointmentUpdate};
use crate::services::listings::AppointmentQueryService;
use crate::services::live::AppointmentUpdates;

pub struct AppointmentLifecycleService {
    supabase: SupabaseClient,
    queries: AppointmentQueryService,
}

impl AppointmentLifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            queries: AppointmentQueryService::new(config),
        }
    }

    /// Validate that the caller may move `appointment` to `new_status`.
    pub fn validate_status_change(
        appointment: &Appointment,
        caller_id: &str,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        if appointment.doctor_id.to_string() != caller_id {
            warn!("User {} tried to change appointment {} of another doctor", caller_id, appointment.id);
            return Err(AppointmentError::NotAssignedDoctor);
        }

        if !appointment.status.can_transition_to(new_status) {
            warn!("Invalid status transition attempted: {} -> {}", appointment.status, new_status);
            return Err(AppointmentError::InvalidTransition {
                from: appointment.status,
                to: new_status,
            });
        }

        Ok(())
    }

    pub async fn update_status(
        &self,
        appointment_id: &str,
        caller_id: &str,
        new_status: AppointmentStatus,
        auth_token: &str,
        updates: &AppointmentUpdates,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.queries.get_appointment(appointment_id, auth_token).await?;
        Self::validate_status_change(&appointment, caller_id, new_status)?;

        debug!("Updating appointment {}: {} -> {}", appointment_id, appointment.status, new_status);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        // The status filter makes the write a no-op if someone changed the row meanwhile.
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&status=eq.{}",
            appointment_id, appointment.status
        );
        let mut updated: Vec<Appointment> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(json!({ "status": new_status })),
            Some(headers),
        ).await?;

        if updated.is_empty() {
            return Err(AppointmentError::Conflict(
                "Appointment was modified concurrently, reload and try again".to_string(),
            ));
        }

        let appointment = updated.swap_remove(0);
        info!("Appointment {} is now {}", appointment.id, appointment.status);

        updates.publish(AppointmentUpdate::from(&appointment));
        Ok(appointment)
    }
}
