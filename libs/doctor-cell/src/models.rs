use std::fmt;

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;

/// Weekday as stored in `doctor_availability.day_of_week` (`"Monday"`...).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Position in a Monday-first week, used for display ordering.
    pub fn week_index(self) -> u8 {
        Weekday::from(self).num_days_from_monday() as u8
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl From<DayOfWeek> for Weekday {
    fn from(day: DayOfWeek) -> Self {
        match day {
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
            DayOfWeek::Sunday => Weekday::Sun,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorAvailability {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvailabilityRequest {
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
}

impl CreateAvailabilityRequest {
    /// Returns the parsed `(start, end)` pair, rejecting empty ranges.
    pub fn validate(&self) -> Result<(NaiveTime, NaiveTime), DoctorError> {
        let start = parse_clock_time(&self.start_time)?;
        let end = parse_clock_time(&self.end_time)?;

        if start >= end {
            return Err(DoctorError::Validation("End time must be after start time".to_string()));
        }

        Ok((start, end))
    }
}

/// Accepts `HH:MM` and `HH:MM:SS`.
pub fn parse_clock_time(raw: &str) -> Result<NaiveTime, DoctorError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| DoctorError::Validation(format!("Invalid time '{}': expected HH:MM", raw)))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDoctorProfileRequest {
    pub full_name: Option<String>,
    pub specialization: Option<String>,
    pub consultation_price: Option<f64>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorSlotsResponse {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub day_of_week: DayOfWeek,
    pub slots: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Availability slot not found")]
    AvailabilityNotFound,

    #[error("Doctor account required")]
    NotADoctor,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for DoctorError {
    fn from(err: anyhow::Error) -> Self {
        DoctorError::Database(err.to_string())
    }
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound
            | DoctorError::ProfileNotFound
            | DoctorError::AvailabilityNotFound => AppError::NotFound(err.to_string()),
            DoctorError::NotADoctor => AppError::Forbidden(err.to_string()),
            DoctorError::Validation(msg) => AppError::ValidationError(msg),
            DoctorError::Database(msg) => AppError::Database(msg),
        }
    }
}
