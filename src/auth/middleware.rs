//! Authentication middleware

use crate::api::error::ApiError;
use crate::api::SharedState;
use crate::auth::{AuthUser, TokenError, TokenService};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Verify the request's access token without touching the store
pub fn authenticate(tokens: &TokenService, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let Some(token) = bearer_token(headers) else {
        tracing::debug!("Rejected request without bearer token");
        return Err(ApiError::unauthorized("No token provided"));
    };

    match tokens.verify_access(token) {
        Ok(payload) => Ok(AuthUser::from(payload)),
        Err(TokenError::Expired) => {
            tracing::debug!("Rejected expired access token");
            Err(ApiError::unauthorized("Token expired"))
        }
        Err(e) => {
            tracing::debug!("Rejected access token: {}", e);
            Err(ApiError::unauthorized("Invalid token"))
        }
    }
}

/// Middleware for requiring authentication.
///
/// On success the verified [`AuthUser`] is available to handlers through
/// `Extension<AuthUser>`.
pub async fn require_auth(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state.tokens, req.headers())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
