use anyhow::Result;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::profile::{Profile, UserRole};

use crate::models::{LoginRequest, SignupRequest};

/// Thin forwarding layer over the hosted auth service. Accounts, passwords
/// and sessions are owned there; this server never issues tokens.
pub struct AuthService {
    supabase: SupabaseClient,
}

impl AuthService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Registers the account. The signup metadata feeds the database trigger
    /// that creates the matching `profiles` row.
    pub async fn signup(&self, request: &SignupRequest, role: UserRole) -> Result<Value> {
        debug!("Signing up {} as {}", request.email, role);

        let body = json!({
            "email": request.email,
            "password": request.password,
            "data": {
                "full_name": request.full_name,
                "role": role.to_string(),
            }
        });

        let result: Value = self.supabase.request(
            Method::POST,
            "/auth/v1/signup",
            None,
            Some(body),
        ).await?;

        info!("Signup accepted for {}", request.email);
        Ok(result)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<Value> {
        debug!("Password login for {}", request.email);

        self.supabase.request(
            Method::POST,
            "/auth/v1/token?grant_type=password",
            None,
            Some(json!({
                "email": request.email,
                "password": request.password,
            })),
        ).await
    }

    pub async fn profile(&self, user_id: &str, auth_token: &str) -> Result<Option<Profile>> {
        self.supabase.get_profile(user_id, auth_token).await
    }
}
