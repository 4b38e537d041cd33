use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, error, info};

use appointment_cell::services::AppointmentQueryService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::attachment;
use crate::models::{
    compose_prescription_text, CreateMedicalRecordRequest, MedicalRecord, MedicalRecordError,
    MedicalRecordView,
};

pub struct MedicalRecordService {
    supabase: SupabaseClient,
    appointments: AppointmentQueryService,
    bucket: String,
}

impl MedicalRecordService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            appointments: AppointmentQueryService::new(config),
            bucket: config.prescriptions_bucket.clone(),
        }
    }

    /// Writes the record of a consultation, uploading the attachment first.
    /// Records are never edited afterwards.
    pub async fn create_record(
        &self,
        doctor_id: &str,
        request: CreateMedicalRecordRequest,
        auth_token: &str,
        now: DateTime<Utc>,
    ) -> Result<MedicalRecordView, MedicalRecordError> {
        if request.diagnosis.trim().is_empty() {
            return Err(MedicalRecordError::Validation("Diagnosis is required".to_string()));
        }

        let appointment_id = request.appointment_id.to_string();
        let appointment = self.appointments.get_appointment(&appointment_id, auth_token).await?;
        if appointment.doctor_id.to_string() != doctor_id.to_lowercase() {
            return Err(MedicalRecordError::NotAssignedDoctor);
        }

        let prepared = request
            .attachment
            .as_ref()
            .map(|upload| attachment::prepare(upload, &appointment_id, now.timestamp_millis()))
            .transpose()?;

        let attachment_path = match prepared {
            Some(file) => {
                debug!("Uploading {} byte attachment to {}/{}", file.bytes.len(), self.bucket, file.object_path);
                self.supabase
                    .upload_object(&self.bucket, &file.object_path, file.bytes, &file.content_type, auth_token)
                    .await
                    .map_err(|e| {
                        error!("Attachment upload failed: {}", e);
                        MedicalRecordError::Upload(e.to_string())
                    })?;
                Some(file.object_path)
            }
            None => None,
        };

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let mut created: Vec<MedicalRecord> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/medical_records",
            Some(auth_token),
            Some(json!({
                "appointment_id": appointment.id,
                "doctor_id": appointment.doctor_id,
                "patient_id": appointment.patient_id,
                "diagnosis": request.diagnosis.trim(),
                "prescription_text": compose_prescription_text(&request.notes, attachment_path.as_deref()),
            })),
            Some(headers),
        ).await?;

        if created.is_empty() {
            return Err(MedicalRecordError::Database("Failed to save medical record".to_string()));
        }

        let record = created.swap_remove(0);
        info!("Medical record {} saved for appointment {}", record.id, appointment_id);
        Ok(MedicalRecordView::from(record))
    }

    /// Records the token may read, newest first. Row-level security decides
    /// visibility; an optional appointment filter narrows it further.
    pub async fn list_records(
        &self,
        appointment_id: Option<&str>,
        auth_token: &str,
    ) -> Result<Vec<MedicalRecordView>, MedicalRecordError> {
        let mut path = "/rest/v1/medical_records?order=created_at.desc".to_string();
        if let Some(id) = appointment_id {
            path.push_str(&format!("&appointment_id=eq.{}", id));
        }

        let records: Vec<MedicalRecord> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        debug!("Found {} medical records", records.len());
        Ok(records.into_iter().map(MedicalRecordView::from).collect())
    }
}
