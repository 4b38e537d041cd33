use std::sync::Arc;

use axum::{
    extract::{Extension, Json, State},
    http::HeaderMap,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::SupabaseError;
use shared_models::auth::{TokenResponse, User};
use shared_models::error::AppError;
use shared_models::profile::Profile;
use shared_utils::extractor::bearer_token;
use shared_utils::jwt::validate_token as validate_jwt;

use crate::models::{LoginRequest, SignupRequest};
use crate::services::AuthService;

pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = bearer_token(&headers)?;
    let user = validate_jwt(token, &config.supabase_jwt_secret).map_err(AppError::Auth)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    debug!("Verifying token");

    let token = bearer_token(&headers)?;
    let valid = validate_jwt(token, &config.supabase_jwt_secret).is_ok();

    Ok(Json(json!({ "valid": valid })))
}

#[axum::debug_handler]
pub async fn signup(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<Value>, AppError> {
    let role = request.validate().map_err(AppError::ValidationError)?;

    let result = AuthService::new(&config)
        .signup(&request, role)
        .await
        .map_err(auth_service_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Signup successful! You can now log in.",
        "user": result.get("user").cloned().unwrap_or(result),
    })))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let session = AuthService::new(&config)
        .login(&request)
        .await
        .map_err(auth_service_error)?;

    Ok(Json(session))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Profile>, AppError> {
    debug!("Getting profile for user: {}", user.id);

    AuthService::new(&config)
        .profile(&user.id, auth.token())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

fn auth_service_error(err: anyhow::Error) -> AppError {
    match err.downcast_ref::<SupabaseError>() {
        Some(SupabaseError::Unauthorized { message, .. }) => AppError::Auth(message.clone()),
        Some(SupabaseError::Api { status, message, .. }) if *status < 500 => {
            AppError::BadRequest(message.clone())
        }
        _ => AppError::ExternalService(err.to_string()),
    }
}
