//! Validation and naming of prescription attachments.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::models::{AttachmentUpload, MedicalRecordError};

pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

/// Request body limit for record creation: a maximal attachment after base64
/// encoding (4 bytes per 3) plus room for the data-URL prefix and the rest of
/// the JSON.
pub const MAX_REQUEST_BYTES: usize = MAX_ATTACHMENT_BYTES.div_ceil(3) * 4 + 64 * 1024;

/// A decoded upload ready for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedAttachment {
    pub object_path: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Images and PDFs only.
pub fn is_allowed_content_type(content_type: &str) -> bool {
    let content_type = content_type.trim().to_ascii_lowercase();
    content_type.starts_with("image/") || content_type == "application/pdf"
}

/// Replaces every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

/// `{appointment_id}/{unix_millis}-{sanitized_name}`
pub fn object_path(appointment_id: &str, unix_millis: i64, file_name: &str) -> String {
    format!("{}/{}-{}", appointment_id, unix_millis, sanitize_file_name(file_name))
}

fn decode(data: &str) -> Result<Vec<u8>, MedicalRecordError> {
    let payload = match data.split_once(";base64,") {
        Some((_, payload)) => payload,
        None => data,
    };

    BASE64
        .decode(payload.trim())
        .map_err(|e| MedicalRecordError::Validation(format!("Failed to decode attachment: {}", e)))
}

pub fn prepare(
    upload: &AttachmentUpload,
    appointment_id: &str,
    unix_millis: i64,
) -> Result<PreparedAttachment, MedicalRecordError> {
    if upload.file_name.trim().is_empty() {
        return Err(MedicalRecordError::Validation("Attachment file name is required".to_string()));
    }
    if !is_allowed_content_type(&upload.content_type) {
        return Err(MedicalRecordError::Validation(format!(
            "Unsupported attachment type '{}': only images and PDFs are accepted",
            upload.content_type
        )));
    }

    let bytes = decode(&upload.data)?;
    if bytes.is_empty() {
        return Err(MedicalRecordError::Validation("Attachment is empty".to_string()));
    }
    if bytes.len() > MAX_ATTACHMENT_BYTES {
        return Err(MedicalRecordError::Validation("Attachment exceeds 10 MB".to_string()));
    }

    Ok(PreparedAttachment {
        object_path: object_path(appointment_id, unix_millis, &upload.file_name),
        content_type: upload.content_type.trim().to_string(),
        bytes,
    })
}
