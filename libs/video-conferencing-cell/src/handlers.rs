// libs/video-conferencing-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::VideoRoom;
use crate::services::VideoRoomService;

#[axum::debug_handler]
pub async fn get_appointment_room(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<VideoRoom>, AppError> {
    let room = VideoRoomService::new(&state)
        .room_for(&appointment_id.to_string(), &user.id, auth.token())
        .await?;

    Ok(Json(room))
}
