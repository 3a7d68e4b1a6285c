//! Authentication tests
//! Token service, password hasher and bearer-token middleware helpers

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue, StatusCode};
use sketchroom::api::ApiError;
use sketchroom::auth::{
    authenticate, Claims, PasswordHasher, TokenError, TokenPayload, TokenService,
};
use sketchroom::config::AuthConfig;

fn auth_config() -> AuthConfig {
    AuthConfig {
        access_secret: "integration-access-secret".to_string(),
        refresh_secret: "integration-refresh-secret".to_string(),
        bcrypt_cost: 4,
        ..AuthConfig::default()
    }
}

fn alice() -> TokenPayload {
    TokenPayload {
        user_id: "3f1c9a34-2b8e-4c55-9d0e-1a2b3c4d5e6f".to_string(),
        email: "alice@example.com".to_string(),
        name: "Alice".to_string(),
    }
}

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    headers
}

#[test]
fn test_token_pair_format() {
    let tokens = TokenService::new(&auth_config());
    let pair = tokens.issue_pair(&alice()).expect("Failed to issue tokens");

    assert_eq!(pair.access_token.split('.').count(), 3); // JWT format: header.payload.signature
    assert_eq!(pair.refresh_token.split('.').count(), 3);
    assert_ne!(pair.access_token, pair.refresh_token);
}

#[test]
fn test_claims_mirror_user_and_windows() {
    let tokens = TokenService::new(&auth_config());
    let pair = tokens.issue_pair_at(&alice(), 1_700_000_000).unwrap();

    // Read the payload segment without verifying to inspect iat/exp
    let decode_claims = |token: &str| -> Claims {
        let payload = token.split('.').nth(1).unwrap();
        let bytes = URL_SAFE_NO_PAD.decode(payload).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    };

    let access = decode_claims(&pair.access_token);
    assert_eq!(access.payload, alice());
    assert_eq!(access.iat, 1_700_000_000);
    assert_eq!(access.exp - access.iat, 15 * 60);

    let refresh = decode_claims(&pair.refresh_token);
    assert_eq!(refresh.payload, alice());
    assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 60 * 60);
}

#[test]
fn test_access_and_refresh_secrets_are_separate() {
    let tokens = TokenService::new(&auth_config());
    let pair = tokens.issue_pair(&alice()).unwrap();

    assert_eq!(tokens.verify_access(&pair.access_token).unwrap(), alice());
    assert_eq!(tokens.verify_refresh(&pair.refresh_token).unwrap(), alice());
    assert_eq!(tokens.verify_access(&pair.refresh_token), Err(TokenError::Invalid));
    assert_eq!(tokens.verify_refresh(&pair.access_token), Err(TokenError::Invalid));
}

#[test]
fn test_expired_access_token_reports_expired() {
    let tokens = TokenService::new(&auth_config());
    let issued = chrono::Utc::now().timestamp() - 15 * 60 - 5;
    let pair = tokens.issue_pair_at(&alice(), issued).unwrap();

    assert_eq!(tokens.verify_access(&pair.access_token), Err(TokenError::Expired));
}

#[test]
fn test_tampered_token_rejected() {
    let tokens = TokenService::new(&auth_config());
    let pair = tokens.issue_pair(&alice()).unwrap();

    let mut parts: Vec<&str> = pair.access_token.split('.').collect();
    let forged_signature = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
    parts[2] = forged_signature;
    let forged = parts.join(".");

    assert_eq!(tokens.verify_access(&forged), Err(TokenError::Invalid));
}

#[test]
fn test_custom_lifetimes() {
    let config = AuthConfig {
        access_ttl_secs: 60,
        refresh_ttl_secs: 120,
        ..auth_config()
    };
    let tokens = TokenService::new(&config);
    assert_eq!(tokens.access_ttl_secs(), 60);
    assert_eq!(tokens.refresh_ttl_secs(), 120);

    let issued = chrono::Utc::now().timestamp() - 90;
    let pair = tokens.issue_pair_at(&alice(), issued).unwrap();
    assert_eq!(tokens.verify_access(&pair.access_token), Err(TokenError::Expired));
    assert!(tokens.verify_refresh(&pair.refresh_token).is_ok());
}

#[test]
fn test_password_hasher_round_trip() {
    let hasher = PasswordHasher::new(4);
    let hashed = hasher.hash("correct horse").unwrap();

    assert_ne!(hashed, "correct horse");
    assert!(hasher.verify("correct horse", &hashed));
    assert!(!hasher.verify("battery staple", &hashed));
}

#[test]
fn test_authenticate_success() {
    let tokens = TokenService::new(&auth_config());
    let pair = tokens.issue_pair(&alice()).unwrap();

    let user = authenticate(&tokens, &bearer(&pair.access_token)).unwrap();
    assert_eq!(user.user_id, alice().user_id);
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.name, "Alice");
}

#[test]
fn test_authenticate_rejections() {
    let tokens = TokenService::new(&auth_config());
    let expired = tokens
        .issue_pair_at(&alice(), chrono::Utc::now().timestamp() - 3600)
        .unwrap();

    let cases: Vec<(HeaderMap, &str)> = vec![
        (HeaderMap::new(), "No token provided"),
        (bearer(&expired.access_token), "Token expired"),
        (bearer("garbage"), "Invalid token"),
    ];

    for (headers, message) in cases {
        let err = authenticate(&tokens, &headers).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err, ApiError::unauthorized(message));
    }
}
