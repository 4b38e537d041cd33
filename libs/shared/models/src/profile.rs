use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Patient,
    Doctor,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Patient => write!(f, "patient"),
            UserRole::Doctor => write!(f, "doctor"),
        }
    }
}

/// A row of the `profiles` table, created by the database on signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub role: UserRole,
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub consultation_price: Option<f64>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl Profile {
    pub fn is_doctor(&self) -> bool {
        self.role == UserRole::Doctor
    }

    /// Full name, else email, else the given fallback.
    pub fn display_name(&self, fallback: &str) -> String {
        self.full_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.email.as_deref().filter(|email| !email.is_empty()))
            .unwrap_or(fallback)
            .to_string()
    }
}
