use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use shared_models::auth::{JwtClaims, User};

type HmacSha256 = Hmac<Sha256>;

/// Validates an HS256 access token issued by the hosted auth service and
/// returns the identity it carries.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let (signing_input, claims_b64, signature_b64) = split_token(token)?;
    verify_signature(signing_input, signature_b64, jwt_secret)?;
    let claims = decode_claims(claims_b64)?;

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    let created_at = claims.iat
        .and_then(|iat| Utc.timestamp_opt(iat as i64, 0).single());

    let user = User {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
        metadata: claims.user_metadata,
        created_at,
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}

fn split_token(token: &str) -> Result<(&str, &str, &str), String> {
    let mut parts = token.rsplitn(2, '.');
    let signature = parts.next().ok_or("Invalid token format")?;
    let signing_input = parts.next().ok_or("Invalid token format")?;

    let mut head = signing_input.splitn(2, '.');
    let header = head.next().unwrap_or_default();
    let claims = head.next().ok_or("Invalid token format")?;

    if header.is_empty() || claims.is_empty() || claims.contains('.') {
        return Err("Invalid token format".to_string());
    }

    Ok((signing_input, claims, signature))
}

fn verify_signature(signing_input: &str, signature_b64: &str, secret: &str) -> Result<(), String> {
    let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
        debug!("Failed to decode signature: {}", e);
        "Invalid signature encoding".to_string()
    })?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());

    mac.verify_slice(&signature).map_err(|_| {
        debug!("Token signature verification failed");
        "Invalid token signature".to_string()
    })
}

fn decode_claims(claims_b64: &str) -> Result<JwtClaims, String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .map_err(|_| "Invalid claims encoding".to_string())?;

    serde_json::from_slice(&bytes).map_err(|e| {
        debug!("Failed to parse claims: {}", e);
        "Invalid claims format".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{JwtTestUtils, TestUser};

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn accepts_a_freshly_signed_token() {
        let user = TestUser::patient("pat@example.com");
        let token = JwtTestUtils::create_test_token(&user, SECRET, Some(1));

        let validated = validate_token(&token, SECRET).unwrap();
        assert_eq!(validated.id, user.id);
        assert_eq!(validated.email.as_deref(), Some("pat@example.com"));
    }

    #[test]
    fn rejects_expired_and_forged_tokens() {
        let user = TestUser::default();

        let expired = JwtTestUtils::create_expired_token(&user, SECRET);
        assert_eq!(validate_token(&expired, SECRET).unwrap_err(), "Token expired");

        let forged = JwtTestUtils::create_invalid_signature_token(&user);
        assert_eq!(validate_token(&forged, SECRET).unwrap_err(), "Invalid token signature");
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert_eq!(validate_token("only-one-part", SECRET).unwrap_err(), "Invalid token format");
        assert!(validate_token(&JwtTestUtils::create_malformed_token(), SECRET).is_err());
        assert_eq!(validate_token("a.b.c", "").unwrap_err(), "JWT secret is not set");
    }
}
