//! API route handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Extension, Json,
};

use super::error::ApiError;
use super::models::{
    ChatsResponse, CreateRoomRequest, CreateRoomResponse, ElementsResponse, RefreshRequest,
    RefreshToken, RoomResponse, SigninRequest, SigninResponse, SignupRequest, SignupResponse,
    INCORRECT_INPUTS,
};
use super::server::SharedState;
use crate::auth::{AuthUser, TokenPair, TokenPayload};
use crate::error::Error;
use crate::store::{NewUser, CHAT_HISTORY_LIMIT};

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection);
        ApiError::bad_request(INCORRECT_INPUTS)
    })
}

// Health check

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// Account routes

pub async fn signup(
    State(state): State<SharedState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<SignupResponse>, ApiError> {
    let input = parse_body(payload)?.validate()?;

    let password_hash = state
        .hasher
        .hash_blocking(input.password)
        .await
        .map_err(|e| ApiError::internal("Failed to hash password", e))?;

    let user = state
        .store
        .create_user(NewUser {
            email: input.email,
            password_hash,
            name: input.name,
        })
        .await
        .map_err(|e| match e {
            Error::UserAlreadyExists(_) => {
                ApiError::conflict("User already exists with this email")
            }
            e => ApiError::internal("Failed to create user", e),
        })?;

    tracing::info!("Created user {}", user.id);
    Ok(Json(SignupResponse { user_id: user.id }))
}

pub async fn signin(
    State(state): State<SharedState>,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<Json<SigninResponse>, ApiError> {
    let input = parse_body(payload)?.validate()?;

    let user = state
        .store
        .find_user_by_email(&input.email)
        .await
        .map_err(|e| ApiError::internal("Failed to look up user", e))?;

    // Unknown email and wrong password look the same to the client, down to
    // the bcrypt time spent
    let matches = state
        .hasher
        .verify_account_blocking(input.password, user.as_ref().map(|u| u.password.clone()))
        .await
        .map_err(|e| ApiError::internal("Failed to verify password", e))?;
    let Some(user) = user.filter(|_| matches) else {
        tracing::debug!("Rejected sign-in for {}", input.email);
        return Err(ApiError::forbidden("Not authorized"));
    };

    let tokens = state
        .tokens
        .issue_pair(&TokenPayload::from_user(&user))
        .map_err(|e| ApiError::internal("Failed to issue tokens", e))?;

    Ok(Json(SigninResponse {
        tokens,
        user: user.into(),
    }))
}

pub async fn refresh(
    State(state): State<SharedState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    // A missing or unparseable body is treated as a missing token
    let request = payload.map(|Json(body)| body).unwrap_or_default();
    let token = match request.token() {
        RefreshToken::Present(token) => token,
        RefreshToken::Missing => return Err(ApiError::unauthorized("Refresh token required")),
        RefreshToken::Malformed => {
            tracing::debug!("Rejected non-string refresh token");
            return Err(ApiError::unauthorized("Invalid refresh token"));
        }
    };

    let claims = state.tokens.verify_refresh(token).map_err(|e| {
        tracing::debug!("Rejected refresh token: {}", e);
        ApiError::unauthorized("Invalid refresh token")
    })?;

    let user = state
        .store
        .find_user_by_id(&claims.user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to look up user", e))?;
    let Some(user) = user else {
        return Err(ApiError::unauthorized("User not found"));
    };

    let tokens = state
        .tokens
        .issue_pair(&TokenPayload::from_user(&user))
        .map_err(|e| ApiError::internal("Failed to issue tokens", e))?;

    Ok(Json(tokens))
}

// Room routes

pub async fn create_room(
    State(state): State<SharedState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Result<Json<CreateRoomResponse>, ApiError> {
    let slug = parse_body(payload)?.validate()?;

    let room = state
        .store
        .create_room(&slug, &user.user_id)
        .await
        .map_err(|e| match e {
            Error::RoomAlreadyExists(_) => ApiError::conflict("Room already exists with this name"),
            e => ApiError::internal("Failed to create room", e),
        })?;

    tracing::info!("User {} created room {} ({})", user.user_id, room.id, room.slug);
    Ok(Json(CreateRoomResponse { room_id: room.id }))
}

pub async fn get_room(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<RoomResponse>, ApiError> {
    let room = state
        .store
        .find_room_by_slug(&slug)
        .await
        .map_err(|e| ApiError::internal("Failed to look up room", e))?;

    Ok(Json(RoomResponse { room }))
}

pub async fn list_chats(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
) -> Json<ChatsResponse> {
    let Ok(room_id) = room_id.parse::<i64>() else {
        tracing::debug!("Non-numeric room id: {}", room_id);
        return Json(ChatsResponse { messages: Vec::new() });
    };

    match state.store.list_chats(room_id, CHAT_HISTORY_LIMIT).await {
        Ok(messages) => Json(ChatsResponse { messages }),
        Err(e) => {
            tracing::error!("Failed to list chats for room {}: {}", room_id, e);
            Json(ChatsResponse { messages: Vec::new() })
        }
    }
}

pub async fn list_elements(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
) -> Json<ElementsResponse> {
    let Ok(room_id) = room_id.parse::<i64>() else {
        tracing::debug!("Non-numeric room id: {}", room_id);
        return Json(ElementsResponse { elements: Vec::new() });
    };

    match state.store.list_elements(room_id).await {
        Ok(elements) => Json(ElementsResponse { elements }),
        Err(e) => {
            tracing::error!("Failed to list elements for room {}: {}", room_id, e);
            Json(ElementsResponse { elements: Vec::new() })
        }
    }
}
