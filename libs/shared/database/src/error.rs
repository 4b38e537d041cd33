use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupabaseError {
    #[error("Authentication error: {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Resource not found: {message}")]
    NotFound { message: String },

    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

/// Postgres error codes that mean "the row collides with an existing one".
const CONFLICT_CODES: [&str; 2] = ["23P01", "23505"];

impl SupabaseError {
    /// Builds an error from a non-success response, pulling `code` and
    /// `message` out of a PostgREST error body when there is one.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let code = parsed
            .as_ref()
            .and_then(|v| v.get("code"))
            .and_then(|c| c.as_str())
            .map(str::to_string);
        let message = parsed
            .as_ref()
            .and_then(|v| v.get("message").or_else(|| v.get("msg")).or_else(|| v.get("error_description")))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string());

        match status {
            401 | 403 => SupabaseError::Unauthorized { status, message },
            404 => SupabaseError::NotFound { message },
            _ => SupabaseError::Api { status, code, message },
        }
    }

    pub fn is_conflict(&self) -> bool {
        match self {
            SupabaseError::Api { status, code, message } => {
                *status == 409
                    || code.as_deref().map_or(false, |c| CONFLICT_CODES.contains(&c))
                    || message.contains("conflicting key value")
                    || message.contains("duplicate key value")
            }
            _ => false,
        }
    }

    /// The database's own wording, without the status prefix.
    pub fn message(&self) -> &str {
        match self {
            SupabaseError::Unauthorized { message, .. }
            | SupabaseError::NotFound { message }
            | SupabaseError::Api { message, .. } => message,
            SupabaseError::InvalidHeader(message) => message,
        }
    }
}

pub fn is_conflict(err: &anyhow::Error) -> bool {
    err.downcast_ref::<SupabaseError>()
        .map_or(false, SupabaseError::is_conflict)
}
