use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CreateAvailabilityRequest, DoctorAvailability, DoctorError};

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Weekly schedule of a doctor, Monday first, then by start time.
    pub async fn get_doctor_availability(
        &self,
        doctor_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<DoctorAvailability>, DoctorError> {
        debug!("Fetching availability for doctor: {}", doctor_id);

        let path = format!(
            "/rest/v1/doctor_availability?doctor_id=eq.{}&order=start_time.asc",
            doctor_id
        );
        let mut rows: Vec<DoctorAvailability> = self.supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        sort_weekly(&mut rows);
        Ok(rows)
    }

    pub async fn create_availability(
        &self,
        doctor_id: &str,
        request: CreateAvailabilityRequest,
        auth_token: &str,
    ) -> Result<DoctorAvailability, DoctorError> {
        let (start, end) = request.validate()?;
        debug!("Creating {} availability {}-{} for doctor {}", request.day_of_week, start, end, doctor_id);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let mut created: Vec<DoctorAvailability> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/doctor_availability",
            Some(auth_token),
            Some(json!({
                "doctor_id": doctor_id,
                "day_of_week": request.day_of_week,
                "start_time": start.format("%H:%M").to_string(),
                "end_time": end.format("%H:%M").to_string(),
            })),
            Some(headers),
        ).await?;

        if created.is_empty() {
            return Err(DoctorError::Database("Failed to create availability".to_string()));
        }

        let availability = created.swap_remove(0);
        info!("Availability {} created for doctor {}", availability.id, doctor_id);
        Ok(availability)
    }

    /// Removes one of the doctor's own rows; row-level security backs the
    /// `doctor_id` filter.
    pub async fn delete_availability(
        &self,
        doctor_id: &str,
        availability_id: &str,
        auth_token: &str,
    ) -> Result<(), DoctorError> {
        debug!("Deleting availability {} of doctor {}", availability_id, doctor_id);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let path = format!(
            "/rest/v1/doctor_availability?id=eq.{}&doctor_id=eq.{}",
            availability_id, doctor_id
        );
        let deleted: Vec<DoctorAvailability> = self.supabase
            .request_with_headers(Method::DELETE, &path, Some(auth_token), None, Some(headers))
            .await?;

        if deleted.is_empty() {
            return Err(DoctorError::AvailabilityNotFound);
        }

        Ok(())
    }
}

/// Monday to Sunday, then by start time. Text ordering from the database
/// would be alphabetical by day name.
pub fn sort_weekly(rows: &mut [DoctorAvailability]) {
    rows.sort_by(|a, b| {
        a.day_of_week
            .week_index()
            .cmp(&b.day_of_week.week_index())
            .then_with(|| a.start_time.cmp(&b.start_time))
    });
}
