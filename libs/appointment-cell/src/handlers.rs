// libs/appointment-cell/src/handlers.rs
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use axum_extra::TypedHeader;
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream};
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use uuid::Uuid;

use doctor_cell::services::DoctorService;
use notification_cell::EmailService;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::profile::UserRole;
use shared_utils::time::format_locale_timestamp;

use crate::models::{BookAppointmentRequest, BookingConfirmation, UpdateStatusRequest};
use crate::services::{
    AppointmentLifecycleService, AppointmentQueryService, AppointmentUpdates, BookingService,
};

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<BookingConfirmation>), AppError> {
    let token = auth.token();

    let doctor = DoctorService::new(&state)
        .get_doctor(&request.doctor_id.to_string(), Some(token))
        .await?;

    let confirmation = BookingService::new(&state)
        .book_appointment(&user.id, &request, token, Utc::now())
        .await?;

    let doctor_name = doctor.full_name.unwrap_or_default();
    spawn_confirmation_email(&state, &user, doctor_name, confirmation.start_time);

    Ok((StatusCode::CREATED, Json(confirmation)))
}

/// Fire and forget: the booking already succeeded, so delivery problems are
/// only logged.
fn spawn_confirmation_email(state: &AppConfig, user: &User, doctor_name: String, start_time: DateTime<Utc>) {
    let Some(to) = user.email.clone().filter(|email| !email.is_empty()) else {
        warn!("User {} has no email, skipping booking confirmation", user.id);
        return;
    };
    let patient_name = user.metadata_full_name().unwrap_or("Patient").to_string();
    let time = format_locale_timestamp(&start_time);
    let email = EmailService::new(state);

    tokio::spawn(async move {
        let report = email.send_confirmation(&to, &patient_name, &doctor_name, &time).await;
        if !report.success {
            warn!("Email send failed: {}", report.error.unwrap_or_default());
        }
    });
}

/// Dashboard listing; the caller's profile role picks the view.
#[axum::debug_handler]
pub async fn get_my_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let service = AppointmentQueryService::new(&state);
    let profile = service.caller_profile(&user.id, token).await?;

    let body = match profile.role {
        UserRole::Patient => {
            let appointments = service.list_for_patient(&user.id, token).await?;
            json!({ "role": profile.role, "total": appointments.len(), "appointments": appointments })
        }
        UserRole::Doctor => {
            let appointments = service.list_for_doctor(&user.id, token).await?;
            json!({ "role": profile.role, "total": appointments.len(), "appointments": appointments })
        }
    };

    Ok(Json(body))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let detail = AppointmentQueryService::new(&state)
        .get_detail(&appointment_id.to_string(), auth.token())
        .await?;

    Ok(Json(json!(detail)))
}

#[axum::debug_handler]
pub async fn update_status(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Extension(updates): Extension<AppointmentUpdates>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentLifecycleService::new(&state)
        .update_status(&appointment_id.to_string(), &user.id, request.status, auth.token(), &updates)
        .await?;

    Ok(Json(json!(appointment)))
}

/// Server-sent events for status changes of the caller's appointments.
pub async fn stream_updates(
    Extension(user): Extension<User>,
    Extension(updates): Extension<AppointmentUpdates>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let user_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Invalid user id in token".to_string()))?;

    info!("User {} subscribed to appointment updates", user_id);
    let receiver = updates.subscribe();

    let events = stream::unfold(receiver, move |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(update) if update.concerns(&user_id) => {
                    match Event::default().event("appointment").json_data(&update) {
                        Ok(event) => return Some((Ok(event), receiver)),
                        Err(e) => warn!("Failed to encode appointment update: {}", e),
                    }
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Live subscriber {} lagged, skipped {} updates", user_id, skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
