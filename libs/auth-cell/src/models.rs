use serde::{Deserialize, Serialize};

use shared_models::profile::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "patient".to_string()
}

impl SignupRequest {
    /// Checks the form and resolves the requested clinic role.
    pub fn validate(&self) -> Result<UserRole, String> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err("A valid email is required".to_string());
        }
        if self.password.is_empty() {
            return Err("Password is required".to_string());
        }
        if self.full_name.trim().is_empty() {
            return Err("Full name is required".to_string());
        }

        match self.role.as_str() {
            "patient" => Ok(UserRole::Patient),
            "doctor" => Ok(UserRole::Doctor),
            other => Err(format!("Unknown role '{}': expected patient or doctor", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
