//! Hourly slot candidates derived from weekly availability.
//!
//! Candidates are not checked against existing bookings: the database's
//! exclusion constraint rejects collisions when the booking is inserted.

use chrono::{Datelike, NaiveDate};

use crate::models::{DayOfWeek, DoctorAvailability};

/// Leading hour of an `HH[:MM[:SS]]` string.
fn parse_hour(raw: &str) -> Option<u32> {
    raw.split(':')
        .next()?
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|hour| *hour <= 24)
}

/// Labels `HH:00` from the start hour up to, not including, the end hour.
/// Minutes are ignored, so `09:30`-`12:00` yields `09:00`, `10:00`, `11:00`.
pub fn generate_hourly_slots(start_time: &str, end_time: &str) -> Vec<String> {
    match (parse_hour(start_time), parse_hour(end_time)) {
        (Some(start), Some(end)) => (start..end).map(|hour| format!("{:02}:00", hour)).collect(),
        _ => Vec::new(),
    }
}

/// Union of the hourly labels of every availability row on the date's weekday.
pub fn slots_for_date(availability: &[DoctorAvailability], date: NaiveDate) -> Vec<String> {
    let day = DayOfWeek::from(date.weekday());

    let mut slots: Vec<String> = availability
        .iter()
        .filter(|row| row.day_of_week == day)
        .flat_map(|row| generate_hourly_slots(&row.start_time, &row.end_time))
        .collect();

    slots.sort();
    slots.dedup();
    slots
}
