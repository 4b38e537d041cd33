use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_config::AppConfig;

use crate::handlers;

/// Email and cron endpoints. Neither uses user sessions: the cron route
/// checks its own shared secret.
pub fn notification_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/emails/send", post(handlers::send_email))
        .route("/cron/reminders", get(handlers::run_reminders))
        .with_state(state)
}
