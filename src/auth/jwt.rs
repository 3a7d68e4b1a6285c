//! JWT token handling
//!
//! Access and refresh tokens carry the same [`TokenPayload`] but are signed
//! with separate HMAC secrets, so a token of one kind never verifies as the
//! other.

use crate::auth::models::{Claims, TokenPair, TokenPayload};
use crate::config::AuthConfig;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

/// Token verification and signing failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token")]
    Invalid,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

#[derive(Clone)]
struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Issues and verifies access/refresh token pairs
#[derive(Clone)]
pub struct TokenService {
    access: SigningKey,
    refresh: SigningKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    /// Build the service from validated auth configuration
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access: SigningKey::new(config.access_secret.as_bytes()),
            refresh: SigningKey::new(config.refresh_secret.as_bytes()),
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
        }
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }

    /// Issue a fresh token pair for the given identity
    pub fn issue_pair(&self, payload: &TokenPayload) -> Result<TokenPair, TokenError> {
        self.issue_pair_at(payload, chrono::Utc::now().timestamp())
    }

    /// Issue a token pair as if it were signed at `issued_at` (Unix seconds)
    pub fn issue_pair_at(
        &self,
        payload: &TokenPayload,
        issued_at: i64,
    ) -> Result<TokenPair, TokenError> {
        let access_token = sign(&self.access, payload, issued_at, self.access_ttl_secs)?;
        let refresh_token = sign(&self.refresh, payload, issued_at, self.refresh_ttl_secs)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verify an access token and return its identity claims
    pub fn verify_access(&self, token: &str) -> Result<TokenPayload, TokenError> {
        verify(&self.access, token).map(|claims| claims.payload)
    }

    /// Verify a refresh token and return its identity claims
    pub fn verify_refresh(&self, token: &str) -> Result<TokenPayload, TokenError> {
        verify(&self.refresh, token).map(|claims| claims.payload)
    }
}

fn sign(
    key: &SigningKey,
    payload: &TokenPayload,
    issued_at: i64,
    ttl_secs: i64,
) -> Result<String, TokenError> {
    let claims = Claims {
        payload: payload.clone(),
        iat: issued_at,
        exp: issued_at + ttl_secs,
    };

    encode(&Header::new(Algorithm::HS256), &claims, &key.encoding)
        .map_err(|e| TokenError::Signing(e.to_string()))
}

fn verify(key: &SigningKey, token: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(token, &key.decoding, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&AuthConfig {
            access_secret: "access-secret-for-tests".to_string(),
            refresh_secret: "refresh-secret-for-tests".to_string(),
            ..AuthConfig::default()
        })
    }

    fn payload() -> TokenPayload {
        TokenPayload {
            user_id: "user-1".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let tokens = service();
        let pair = tokens.issue_pair(&payload()).expect("Failed to issue tokens");

        assert_eq!(tokens.verify_access(&pair.access_token).unwrap(), payload());
        assert_eq!(tokens.verify_refresh(&pair.refresh_token).unwrap(), payload());
    }

    #[test]
    fn test_tokens_do_not_cross_verify() {
        let tokens = service();
        let pair = tokens.issue_pair(&payload()).unwrap();

        assert_eq!(tokens.verify_refresh(&pair.access_token), Err(TokenError::Invalid));
        assert_eq!(tokens.verify_access(&pair.refresh_token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_expired_access_token() {
        let tokens = service();
        let sixteen_minutes_ago = chrono::Utc::now().timestamp() - 16 * 60;
        let pair = tokens.issue_pair_at(&payload(), sixteen_minutes_ago).unwrap();

        assert_eq!(tokens.verify_access(&pair.access_token), Err(TokenError::Expired));
        // The refresh window is much longer
        assert!(tokens.verify_refresh(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_access_token_still_valid_inside_window() {
        let tokens = service();
        let fourteen_minutes_ago = chrono::Utc::now().timestamp() - 14 * 60;
        let pair = tokens.issue_pair_at(&payload(), fourteen_minutes_ago).unwrap();

        assert!(tokens.verify_access(&pair.access_token).is_ok());
    }

    #[test]
    fn test_expired_refresh_token() {
        let tokens = service();
        let eight_days_ago = chrono::Utc::now().timestamp() - 8 * 24 * 60 * 60;
        let pair = tokens.issue_pair_at(&payload(), eight_days_ago).unwrap();

        assert_eq!(tokens.verify_refresh(&pair.refresh_token), Err(TokenError::Expired));
    }

    #[test]
    fn test_malformed_token() {
        let tokens = service();
        assert_eq!(tokens.verify_access("not-a-jwt-token"), Err(TokenError::Invalid));
        assert_eq!(tokens.verify_access("invalid.token.here"), Err(TokenError::Invalid));
        assert_eq!(tokens.verify_access(""), Err(TokenError::Invalid));
    }

    #[test]
    fn test_token_from_other_deployment_rejected() {
        let other = TokenService::new(&AuthConfig {
            access_secret: "someone-elses-access".to_string(),
            refresh_secret: "someone-elses-refresh".to_string(),
            ..AuthConfig::default()
        });
        let pair = other.issue_pair(&payload()).unwrap();

        assert_eq!(service().verify_access(&pair.access_token), Err(TokenError::Invalid));
    }
}
