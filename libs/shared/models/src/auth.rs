use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

/// Identity taken from a validated access token. `role` is the token's
/// database role (usually `authenticated`), not the clinic role; that lives
/// on the profile row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub valid: bool,
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}
impl User {
    /// `full_name` from the signup metadata carried in the token.
    pub fn metadata_full_name(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|meta| meta.get("full_name"))
            .and_then(|name| name.as_str())
            .filter(|name| !name.is_empty())
    }
}
