// libs/video-conferencing-cell/src/services/room.rs
use tracing::{debug, warn};
use uuid::Uuid;

use appointment_cell::services::AppointmentQueryService;
use shared_config::AppConfig;

use crate::models::{VideoConferencingError, VideoRoom};

pub struct VideoRoomService {
    appointments: AppointmentQueryService,
    video_base_url: String,
}

impl VideoRoomService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            appointments: AppointmentQueryService::new(config),
            video_base_url: config.video_base_url.clone(),
        }
    }

    /// Room for a participant of the appointment. Anyone else gets
    /// `NotParticipant`, even if row-level security let the row through.
    pub async fn room_for(
        &self,
        appointment_id: &str,
        user_id: &str,
        auth_token: &str,
    ) -> Result<VideoRoom, VideoConferencingError> {
        let appointment = self.appointments.get_appointment(appointment_id, auth_token).await?;

        let participant = Uuid::parse_str(user_id)
            .map(|caller| appointment.involves(&caller))
            .unwrap_or(false);
        if !participant {
            warn!("User {} denied access to call room of appointment {}", user_id, appointment_id);
            return Err(VideoConferencingError::NotParticipant);
        }

        debug!("User {} joining call room of appointment {}", user_id, appointment_id);
        Ok(VideoRoom::for_appointment(appointment.id, appointment.status, &self.video_base_url))
    }
}
