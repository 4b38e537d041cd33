// libs/video-conferencing-cell/src/lib.rs
//! # Video Conferencing Cell
//!
//! Hands out the embeddable call room of an appointment. Calls run on a
//! public Jitsi deployment: the room name is derived from the appointment id
//! and the provider itself performs no authentication, so the participant
//! check here only keeps strangers off the call page.
//!
//! ## API Endpoints
//!
//! - `GET /video/appointments/{id}/room` - Room name and embed URL for a participant
//!
//! ## Configuration
//!
//! - `VIDEO_BASE_URL` - Call provider base URL (optional, defaults to `https://meet.jit.si`)

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{VideoRoom, VideoConferencingError};
pub use services::VideoRoomService;
pub use router::video_conferencing_routes;
