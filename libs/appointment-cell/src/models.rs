// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub reminder_24h_sent: bool,
    #[serde(default)]
    pub reminder_1h_sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// The call can only be joined once the doctor accepted.
    pub fn can_join(&self) -> bool {
        self.status == AppointmentStatus::Confirmed
    }

    pub fn involves(&self, user_id: &Uuid) -> bool {
        self.patient_id == *user_id || self.doctor_id == *user_id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    /// `pending → confirmed | cancelled`, `confirmed → cancelled`.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (AppointmentStatus::Pending, AppointmentStatus::Confirmed)
                | (AppointmentStatus::Pending, AppointmentStatus::Cancelled)
                | (AppointmentStatus::Confirmed, AppointmentStatus::Cancelled)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    /// Hour label from the slot list, e.g. `"09:00"`.
    pub slot: String,
    /// Caller's offset from UTC in minutes, positive east of Greenwich.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl BookAppointmentRequest {
    /// Real-world UTC offsets run from UTC-12:00 to UTC+14:00.
    pub const OFFSET_RANGE_MINUTES: std::ops::RangeInclusive<i32> = -720..=840;

    /// Combines date and slot in the caller's zone and returns the UTC
    /// instant. Dates before the caller's current local date are rejected.
    pub fn start_time(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppointmentError> {
        if !Self::OFFSET_RANGE_MINUTES.contains(&self.utc_offset_minutes) {
            return Err(AppointmentError::InvalidOffset(self.utc_offset_minutes));
        }
        let offset = Duration::minutes(i64::from(self.utc_offset_minutes));

        let today = now
            .checked_add_signed(offset)
            .ok_or(AppointmentError::DateOutOfRange)?
            .date_naive();

        if self.date < today {
            return Err(AppointmentError::PastDate);
        }

        let slot = NaiveTime::parse_from_str(&self.slot, "%H:%M")
            .map_err(|_| AppointmentError::InvalidSlot(self.slot.clone()))?;

        self.date
            .and_time(slot)
            .and_utc()
            .checked_sub_signed(offset)
            .ok_or(AppointmentError::DateOutOfRange)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub success: bool,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DoctorSummary {
    pub id: Option<Uuid>,
    pub full_name: String,
    pub specialization: String,
}

impl DoctorSummary {
    pub fn unknown() -> Self {
        Self {
            id: None,
            full_name: "Unknown Doctor".to_string(),
            specialization: "General".to_string(),
        }
    }
}

/// Patient dashboard row.
#[derive(Debug, Clone, Serialize)]
pub struct PatientAppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor: DoctorSummary,
    pub display_time: String,
    pub can_join: bool,
}

/// Doctor dashboard row.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorAppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_name: String,
    pub display_time: String,
    pub can_join: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary {
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient: PatientSummary,
    pub display_time: String,
    pub can_join: bool,
}

/// Event pushed to live subscribers after a status change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentUpdate {
    pub id: Uuid,
    pub status: AppointmentStatus,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
}

impl From<&Appointment> for AppointmentUpdate {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id,
            status: appointment.status,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
        }
    }
}

impl AppointmentUpdate {
    pub fn concerns(&self, user_id: &Uuid) -> bool {
        self.patient_id == *user_id || self.doctor_id == *user_id
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Only the assigned doctor can update this appointment")]
    NotAssignedDoctor,

    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Cannot book an appointment in the past")]
    PastDate,

    #[error("Invalid slot '{0}': expected HH:MM")]
    InvalidSlot(String),

    #[error("Invalid UTC offset {0}: expected -720 to 840 minutes")]
    InvalidOffset(i32),

    #[error("Appointment date is out of range")]
    DateOutOfRange,

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for AppointmentError {
    fn from(err: anyhow::Error) -> Self {
        AppointmentError::Database(err.to_string())
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound | AppointmentError::ProfileNotFound => AppError::NotFound(err.to_string()),
            AppointmentError::NotAssignedDoctor => AppError::Forbidden(err.to_string()),
            AppointmentError::InvalidTransition { .. }
            | AppointmentError::PastDate
            | AppointmentError::InvalidSlot(_)
            | AppointmentError::InvalidOffset(_)
            | AppointmentError::DateOutOfRange => AppError::BadRequest(err.to_string()),
            AppointmentError::Conflict(msg) => AppError::Conflict(msg),
            AppointmentError::Database(msg) => AppError::Database(msg),
        }
    }
}
