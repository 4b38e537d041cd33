use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreateMedicalRecordRequest, MedicalRecordView};
use crate::services::MedicalRecordService;

#[axum::debug_handler]
pub async fn create_medical_record(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateMedicalRecordRequest>,
) -> Result<(StatusCode, Json<MedicalRecordView>), AppError> {
    let record = MedicalRecordService::new(&state)
        .create_record(&user.id, request, auth.token(), Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

#[axum::debug_handler]
pub async fn list_medical_records(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let records = MedicalRecordService::new(&state)
        .list_records(None, auth.token())
        .await?;

    Ok(Json(json!({
        "records": records,
        "total": records.len()
    })))
}

#[axum::debug_handler]
pub async fn list_appointment_records(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let records = MedicalRecordService::new(&state)
        .list_records(Some(&appointment_id.to_string()), auth.token())
        .await?;

    Ok(Json(json!({
        "appointment_id": appointment_id,
        "records": records,
        "total": records.len()
    })))
}
