use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use appointment_cell::models::AppointmentError;
use shared_models::error::AppError;

/// Separates the doctor's notes from the storage path of an attached file
/// inside `prescription_text`.
pub const ATTACHMENT_MARKER: &str = "\n\n[FILE_ATTACHMENT]:";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub diagnosis: String,
    #[serde(default)]
    pub prescription_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Builds `prescription_text` from notes and an optional storage path.
pub fn compose_prescription_text(notes: &str, attachment_path: Option<&str>) -> String {
    match attachment_path {
        Some(path) => format!("{}{}{}", notes, ATTACHMENT_MARKER, path),
        None => notes.to_string(),
    }
}

/// Inverse of `compose_prescription_text`.
pub fn split_prescription_text(text: &str) -> (String, Option<String>) {
    match text.rsplit_once(ATTACHMENT_MARKER) {
        Some((notes, path)) if !path.trim().is_empty() => (notes.to_string(), Some(path.trim().to_string())),
        _ => (text.to_string(), None),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MedicalRecordView {
    #[serde(flatten)]
    pub record: MedicalRecord,
    pub notes: String,
    pub attachment_path: Option<String>,
}

impl From<MedicalRecord> for MedicalRecordView {
    fn from(record: MedicalRecord) -> Self {
        let (notes, attachment_path) = split_prescription_text(record.prescription_text.as_deref().unwrap_or_default());
        Self { record, notes, attachment_path }
    }
}

/// Base64 file content; a `data:<type>;base64,` prefix is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMedicalRecordRequest {
    pub appointment_id: Uuid,
    pub diagnosis: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub attachment: Option<AttachmentUpload>,
}

#[derive(Debug, thiserror::Error)]
pub enum MedicalRecordError {
    #[error("Only the appointment's doctor can write its medical record")]
    NotAssignedDoctor,

    #[error("{0}")]
    Validation(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error(transparent)]
    Appointment(#[from] AppointmentError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for MedicalRecordError {
    fn from(err: anyhow::Error) -> Self {
        MedicalRecordError::Database(err.to_string())
    }
}

impl From<MedicalRecordError> for AppError {
    fn from(err: MedicalRecordError) -> Self {
        match err {
            MedicalRecordError::NotAssignedDoctor => AppError::Forbidden(err.to_string()),
            MedicalRecordError::Validation(msg) => AppError::ValidationError(msg),
            MedicalRecordError::Upload(_) => AppError::ExternalService(err.to_string()),
            MedicalRecordError::Appointment(inner) => inner.into(),
            MedicalRecordError::Database(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prescription_text_carries_attachment_path() {
        let text = compose_prescription_text("Rest and fluids", Some("appt/1700000000000-scan.pdf"));
        assert_eq!(text, "Rest and fluids\n\n[FILE_ATTACHMENT]:appt/1700000000000-scan.pdf");

        let (notes, path) = split_prescription_text(&text);
        assert_eq!(notes, "Rest and fluids");
        assert_eq!(path.as_deref(), Some("appt/1700000000000-scan.pdf"));
    }

    #[test]
    fn plain_notes_have_no_attachment() {
        assert_eq!(compose_prescription_text("Ibuprofen", None), "Ibuprofen");
        assert_eq!(split_prescription_text("Ibuprofen\n\nTwice daily"), ("Ibuprofen\n\nTwice daily".to_string(), None));
    }
}
