use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, put},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    // Public directory and booking data
    let public_routes = Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .route("/{doctor_id}/availability", get(handlers::get_doctor_availability))
        .route("/{doctor_id}/slots", get(handlers::get_available_slots));

    // Doctor self-service
    let protected_routes = Router::new()
        .route("/profile", put(handlers::update_profile))
        .route("/me/availability", get(handlers::get_my_availability).post(handlers::create_availability))
        .route("/me/availability/{availability_id}", delete(handlers::delete_availability))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
