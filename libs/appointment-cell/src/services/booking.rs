// libs/appointment-cell/src/services/booking.rs
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::{supabase::SupabaseClient, SupabaseError};

use crate::models::{AppointmentError, AppointmentStatus, BookAppointmentRequest, BookingConfirmation};

/// Books through the `book_appointment` database function, which owns the
/// double-booking rule. Nothing here checks for collisions.
pub struct BookingService {
    supabase: SupabaseClient,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn book_appointment(
        &self,
        patient_id: &str,
        request: &BookAppointmentRequest,
        auth_token: &str,
        now: DateTime<Utc>,
    ) -> Result<BookingConfirmation, AppointmentError> {
        let start_time = request.start_time(now)?;
        debug!("Booking doctor {} at {} for patient {}", request.doctor_id, start_time, patient_id);

        let args = json!({
            "p_patient_id": patient_id,
            "p_doctor_id": request.doctor_id,
            "p_start_time": start_time.to_rfc3339(),
        });

        self.supabase
            .rpc::<Value>("book_appointment", args, auth_token)
            .await
            .map_err(booking_error)?;

        info!("Appointment booked: doctor {} at {}", request.doctor_id, start_time);

        Ok(BookingConfirmation {
            success: true,
            doctor_id: request.doctor_id,
            start_time,
            status: AppointmentStatus::Pending,
        })
    }
}

/// Overlap rejections keep the database's wording so the caller can show it.
fn booking_error(err: anyhow::Error) -> AppointmentError {
    match err.downcast_ref::<SupabaseError>() {
        Some(db_err) if db_err.is_conflict() => {
            warn!("Booking rejected by database: {}", db_err.message());
            AppointmentError::Conflict(db_err.message().to_string())
        }
        _ => AppointmentError::Database(err.to_string()),
    }
}
