//! Request and response bodies

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

use super::error::ApiError;
use crate::auth::TokenPair;
use crate::store::{ChatMessage, Element, RoomWithAdmin, User};

pub const INCORRECT_INPUTS: &str = "Incorrect inputs";
pub const MIN_PASSWORD_LEN: usize = 6;

// Compile-time constant pattern; a panic here is a bug in the codebase.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex - this is a bug")
});

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Password length in UTF-16 code units, as browsers count `minlength`
pub fn password_len(password: &str) -> usize {
    password.encode_utf16().count()
}

fn incorrect() -> ApiError {
    ApiError::bad_request(INCORRECT_INPUTS)
}

// Requests

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    /// Email address used as the login handle
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Signup input that passed validation
#[derive(Debug)]
pub struct ValidSignup {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl SignupRequest {
    pub fn validate(self) -> Result<ValidSignup, ApiError> {
        let email = self.username.filter(|u| is_valid_email(u)).ok_or_else(incorrect)?;
        let password = self
            .password
            .filter(|p| password_len(p) >= MIN_PASSWORD_LEN)
            .ok_or_else(incorrect)?;
        let name = self.name.filter(|n| !n.is_empty()).ok_or_else(incorrect)?;

        Ok(ValidSignup {
            email,
            password,
            name,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SigninRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct ValidSignin {
    pub email: String,
    pub password: String,
}

impl SigninRequest {
    pub fn validate(self) -> Result<ValidSignin, ApiError> {
        let email = self.username.filter(|u| is_valid_email(u)).ok_or_else(incorrect)?;
        let password = self.password.filter(|p| !p.is_empty()).ok_or_else(incorrect)?;
        Ok(ValidSignin { email, password })
    }
}

/// Body of `/refresh`; see [`RefreshRequest::token`]
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<Value>,
}

/// What a `/refresh` body carries in `refreshToken`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshToken<'a> {
    /// Absent or falsy (`null`, `""`, `false`, `0`)
    Missing,
    /// Present but not a string
    Malformed,
    Present(&'a str),
}

impl RefreshRequest {
    pub fn token(&self) -> RefreshToken<'_> {
        match &self.refresh_token {
            None | Some(Value::Null) | Some(Value::Bool(false)) => RefreshToken::Missing,
            Some(Value::String(token)) if token.is_empty() => RefreshToken::Missing,
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => RefreshToken::Missing,
            Some(Value::String(token)) => RefreshToken::Present(token),
            Some(_) => RefreshToken::Malformed,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateRoomRequest {
    /// Becomes the room slug
    pub name: Option<String>,
}

impl CreateRoomRequest {
    pub fn validate(self) -> Result<String, ApiError> {
        self.name.filter(|n| !n.is_empty()).ok_or_else(incorrect)
    }
}

// Responses

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub user_id: String,
}

/// User fields safe to return to the client
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SigninResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ChatsResponse {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub room: Option<RoomWithAdmin>,
}

#[derive(Debug, Serialize)]
pub struct ElementsResponse {
    pub elements: Vec<Element>,
}
