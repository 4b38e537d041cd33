// libs/video-conferencing-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::get,
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn video_conferencing_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/appointments/{appointment_id}/room", get(handlers::get_appointment_room))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
