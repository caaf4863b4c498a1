//! Identity tokens
//!
//! Signed HS256 JWTs carrying the account id and an expiry. The signing
//! secret is process-wide and comes from required configuration.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;
use crate::store::{Account, AccountId};

/// Token validation failures.
///
/// `Expired` is distinguishable so callers can prompt re-authentication;
/// `BadSignature` and `Malformed` surface the same uninformative message
/// to end users.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("token expired")]
    Expired,

    #[error("invalid token signature")]
    BadSignature,
}

/// Claims carried inside an identity token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id; the registry key for the real-time channel
    pub sub: AccountId,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates identity tokens
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_seconds,
        }
    }

    /// Issue a signed token for an account
    pub fn issue(&self, account: &Account) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: account.id,
            username: account.username.clone(),
            iat: now,
            exp: now + self.ttl_seconds,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign token: {}", e)))
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => Err(match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_account() -> Account {
        Account {
            id: 7,
            username: "ada".to_string(),
            email: "ada@x.com".to_string(),
            credential_hash: "hash".to_string(),
            full_name: None,
            bio: None,
            profile_picture_url: None,
        }
    }

    fn test_service(ttl_seconds: i64) -> TokenService {
        TokenService::new(b"test-secret-key-32-bytes-long!!!", ttl_seconds)
    }

    #[test]
    fn issue_then_validate_round_trips() {
        let service = test_service(3600);
        let token = service.issue(&test_account()).unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "ada");
    }

    #[test]
    fn expired_token_is_distinguished() {
        // Expiry well past the default 60s validation leeway
        let service = test_service(-120);
        let token = service.issue(&test_account()).unwrap();

        assert_eq!(service.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_secret_is_a_bad_signature() {
        let issuer = test_service(3600);
        let token = issuer.issue(&test_account()).unwrap();

        let verifier = TokenService::new(b"another-secret-key-32-bytes-long", 3600);
        assert_eq!(verifier.validate(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let service = test_service(3600);
        assert_eq!(
            service.validate("not-a-jwt-at-all"),
            Err(TokenError::Malformed)
        );
    }
}
