use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::get,
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::attachment::MAX_REQUEST_BYTES;
use crate::handlers;

pub fn medical_record_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_medical_records).post(handlers::create_medical_record))
        .route("/appointments/{appointment_id}", get(handlers::list_appointment_records))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
