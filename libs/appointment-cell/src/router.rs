// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, patch, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::AppointmentUpdates;

pub fn appointment_routes(state: Arc<AppConfig>, updates: AppointmentUpdates) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/mine", get(handlers::get_my_appointments))
        .route("/stream", get(handlers::stream_updates))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/status", patch(handlers::update_status))
        .layer(Extension(updates))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
