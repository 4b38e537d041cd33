// libs/video-conferencing-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use appointment_cell::models::{AppointmentError, AppointmentStatus};
use shared_models::error::AppError;

/// Permissions the embedding iframe needs for a call.
pub const IFRAME_ALLOW: &str = "camera *; microphone *; fullscreen; display-capture";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRoom {
    pub appointment_id: Uuid,
    pub room_name: String,
    pub embed_url: String,
    pub allow: String,
    pub status: AppointmentStatus,
}

impl VideoRoom {
    pub fn room_name(appointment_id: &Uuid) -> String {
        format!("telemed-room-{}", appointment_id)
    }

    pub fn for_appointment(appointment_id: Uuid, status: AppointmentStatus, video_base_url: &str) -> Self {
        let room_name = Self::room_name(&appointment_id);
        let embed_url = format!(
            "{}/{}?config.prejoinPageEnabled=false",
            video_base_url.trim_end_matches('/'),
            room_name
        );

        Self {
            appointment_id,
            room_name,
            embed_url,
            allow: IFRAME_ALLOW.to_string(),
            status,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VideoConferencingError {
    #[error("You are not a participant of this appointment")]
    NotParticipant,

    #[error(transparent)]
    Appointment(#[from] AppointmentError),
}

impl From<VideoConferencingError> for AppError {
    fn from(err: VideoConferencingError) -> Self {
        match err {
            VideoConferencingError::NotParticipant => AppError::Forbidden(err.to_string()),
            VideoConferencingError::Appointment(inner) => inner.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_is_derived_from_appointment_id() {
        let id = Uuid::parse_str("6f1c2b8e-8f43-4c55-9d7a-1b2c3d4e5f60").unwrap();
        let room = VideoRoom::for_appointment(id, AppointmentStatus::Confirmed, "https://meet.jit.si/");

        assert_eq!(room.room_name, "telemed-room-6f1c2b8e-8f43-4c55-9d7a-1b2c3d4e5f60");
        assert_eq!(
            room.embed_url,
            "https://meet.jit.si/telemed-room-6f1c2b8e-8f43-4c55-9d7a-1b2c3d4e5f60?config.prejoinPageEnabled=false"
        );
        assert_eq!(room.allow, "camera *; microphone *; fullscreen; display-capture");
    }
}
