//! Access and refresh tokens.
//!
//! Access tokens are HS256 JWTs issued by `eduhub` and carry the user id and
//! role; the RBAC extractors trust the role claim for the token's lifetime.
//! Refresh tokens are opaque: the client holds the plaintext and the
//! `user_sessions` table holds its SHA-256 hex digest.

use chrono::{DateTime, Duration, Utc};
use eduhub_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::JwtConfig;

/// `iss` claim of every token this service signs.
pub const TOKEN_ISSUER: &str = "eduhub";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's database id.
    pub sub: DbId,
    /// `student`, `instructor` or `admin`.
    pub role: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Everything minted for one login or refresh.
#[derive(Debug)]
pub struct IssuedTokens {
    pub access_token: String,
    /// Seconds until the access token expires.
    pub expires_in: i64,
    /// Handed to the client once, never stored.
    pub refresh_token: String,
    pub refresh_token_hash: String,
    pub refresh_expires_at: DateTime<Utc>,
}

pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        iss: TOKEN_ISSUER.to_string(),
        exp: now + config.access_expires_in(),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Decode an access token, checking signature, expiry and issuer.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

/// Mint an access token plus a fresh refresh token for `user_id`.
pub fn issue_tokens(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<IssuedTokens, jsonwebtoken::errors::Error> {
    let access_token = generate_access_token(user_id, role, config)?;
    let refresh_token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());

    Ok(IssuedTokens {
        access_token,
        expires_in: config.access_expires_in(),
        refresh_token_hash: hash_refresh_token(&refresh_token),
        refresh_token,
        refresh_expires_at: Utc::now() + Duration::days(config.refresh_token_expiry_days),
    })
}

/// SHA-256 hex digest of a refresh token.
pub fn hash_refresh_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "unit-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        }
    }

    #[test]
    fn access_token_carries_user_and_role() {
        let token = generate_access_token(7, "instructor", &config()).unwrap();
        let claims = validate_token(&token, &config()).unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, "instructor");
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default 60 second leeway.
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            role: "student".to_string(),
            iss: TOKEN_ISSUER.to_string(),
            exp: now - 600,
            iat: now - 1200,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config().secret.as_bytes()),
        )
        .unwrap();

        assert!(validate_token(&token, &config()).is_err());
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            role: "admin".to_string(),
            iss: "someone-else".to_string(),
            exp: now + 600,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config().secret.as_bytes()),
        )
        .unwrap();

        assert!(validate_token(&token, &config()).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(1, "student", &config()).unwrap();
        let other = JwtConfig {
            secret: "rotated-secret".to_string(),
            ..config()
        };
        assert!(validate_token(&token, &other).is_err());
    }

    #[test]
    fn issued_refresh_token_matches_its_hash() {
        let issued = issue_tokens(3, "student", &config()).unwrap();

        assert_eq!(issued.refresh_token.len(), 64);
        assert_eq!(issued.refresh_token_hash, hash_refresh_token(&issued.refresh_token));
        assert_eq!(issued.expires_in, 900);
        assert!(issued.refresh_expires_at > Utc::now() + Duration::days(6));
    }
}
