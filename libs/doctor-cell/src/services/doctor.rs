use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::profile::Profile;

use crate::models::{DoctorError, UpdateDoctorProfileRequest};

const DOCTOR_COLUMNS: &str = "id,role,full_name,email,specialization,consultation_price,bio";

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Public directory of every doctor profile.
    pub async fn list_doctors(&self, auth_token: Option<&str>) -> Result<Vec<Profile>, DoctorError> {
        debug!("Listing doctors");

        let path = format!(
            "/rest/v1/profiles?role=eq.doctor&select={}&order=full_name.asc",
            DOCTOR_COLUMNS
        );
        let doctors: Vec<Profile> = self.supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        Ok(doctors)
    }

    pub async fn get_doctor(&self, doctor_id: &str, auth_token: Option<&str>) -> Result<Profile, DoctorError> {
        debug!("Fetching doctor profile: {}", doctor_id);

        let path = format!(
            "/rest/v1/profiles?id=eq.{}&role=eq.doctor&select={}",
            doctor_id, DOCTOR_COLUMNS
        );
        let mut rows: Vec<Profile> = self.supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        if rows.is_empty() {
            return Err(DoctorError::NotFound);
        }

        Ok(rows.swap_remove(0))
    }

    /// Loads the caller's profile and fails unless it is a doctor profile.
    pub async fn require_doctor(&self, user_id: &str, auth_token: &str) -> Result<Profile, DoctorError> {
        let profile = self.supabase
            .get_profile(user_id, auth_token)
            .await?
            .ok_or(DoctorError::ProfileNotFound)?;

        if !profile.is_doctor() {
            return Err(DoctorError::NotADoctor);
        }

        Ok(profile)
    }

    pub async fn update_profile(
        &self,
        doctor_id: &str,
        request: UpdateDoctorProfileRequest,
        auth_token: &str,
    ) -> Result<Profile, DoctorError> {
        let update = profile_update(&request)?;
        debug!("Updating doctor profile {} ({} fields)", doctor_id, update.len());

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let path = format!("/rest/v1/profiles?id=eq.{}", doctor_id);
        let mut updated: Vec<Profile> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(Value::Object(update)),
            Some(headers),
        ).await?;

        if updated.is_empty() {
            return Err(DoctorError::ProfileNotFound);
        }

        info!("Doctor profile {} updated", doctor_id);
        Ok(updated.swap_remove(0))
    }
}

/// Only the provided fields are written.
fn profile_update(request: &UpdateDoctorProfileRequest) -> Result<Map<String, Value>, DoctorError> {
    let mut update = Map::new();

    if let Some(name) = &request.full_name {
        if name.trim().is_empty() {
            return Err(DoctorError::Validation("Full name cannot be empty".to_string()));
        }
        update.insert("full_name".to_string(), json!(name.trim()));
    }
    if let Some(specialization) = &request.specialization {
        update.insert("specialization".to_string(), json!(specialization));
    }
    if let Some(price) = request.consultation_price {
        if !price.is_finite() || price < 0.0 {
            return Err(DoctorError::Validation("Consultation price cannot be negative".to_string()));
        }
        update.insert("consultation_price".to_string(), json!(price));
    }
    if let Some(bio) = &request.bio {
        update.insert("bio".to_string(), json!(bio));
    }

    if update.is_empty() {
        return Err(DoctorError::Validation("No profile fields to update".to_string()));
    }

    Ok(update)
}
