use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use chrono::Datelike;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    CreateAvailabilityRequest, DayOfWeek, DoctorSlotsResponse, SlotsQuery,
    UpdateDoctorProfileRequest,
};
use crate::services::{slots, AvailabilityService, DoctorService};

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);
    let doctors = doctor_service.list_doctors(None).await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);
    let doctor = doctor_service.get_doctor(&doctor_id.to_string(), None).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn get_doctor_availability(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);
    let availability = availability_service
        .get_doctor_availability(&doctor_id.to_string(), None)
        .await?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<DoctorSlotsResponse>, AppError> {
    let availability_service = AvailabilityService::new(&state);
    let availability = availability_service
        .get_doctor_availability(&doctor_id.to_string(), None)
        .await?;

    Ok(Json(DoctorSlotsResponse {
        doctor_id,
        date: query.date,
        day_of_week: DayOfWeek::from(query.date.weekday()),
        slots: slots::slots_for_date(&availability, query.date),
    }))
}

// ==============================================================================
// PROTECTED DOCTOR HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateDoctorProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let doctor_service = DoctorService::new(&state);

    doctor_service.require_doctor(&user.id, token).await?;
    let profile = doctor_service.update_profile(&user.id, request, token).await?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn get_my_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    DoctorService::new(&state).require_doctor(&user.id, token).await?;

    let availability = AvailabilityService::new(&state)
        .get_doctor_availability(&user.id, Some(token))
        .await?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn create_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAvailabilityRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let token = auth.token();
    DoctorService::new(&state).require_doctor(&user.id, token).await?;

    let availability = AvailabilityService::new(&state)
        .create_availability(&user.id, request, token)
        .await?;

    Ok((StatusCode::CREATED, Json(json!(availability))))
}

#[axum::debug_handler]
pub async fn delete_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(availability_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    DoctorService::new(&state).require_doctor(&user.id, token).await?;

    AvailabilityService::new(&state)
        .delete_availability(&user.id, &availability_id.to_string(), token)
        .await?;

    info!("Doctor {} removed availability {}", user.id, availability_id);
    Ok(Json(json!({
        "success": true,
        "message": "Availability slot deleted"
    })))
}
