use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use appointment_cell::AppointmentUpdates;
use auth_cell::router::auth_routes;
use doctor_cell::router::doctor_routes;
use medical_record_cell::router::medical_record_routes;
use notification_cell::router::notification_routes;
use shared_config::AppConfig;
use video_conferencing_cell::router::video_conferencing_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    // One hub per process; every status change fans out to open streams.
    let updates = AppointmentUpdates::default();

    Router::new()
        .route("/", get(|| async { "Telemed API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone(), updates))
        .nest("/medical-records", medical_record_routes(state.clone()))
        .nest("/video", video_conferencing_routes(state.clone()))
        .nest("/api", notification_routes(state))
}
