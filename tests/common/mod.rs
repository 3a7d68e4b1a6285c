#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use sketchroom::api::{create_router, AppState};
use sketchroom::auth::TokenService;
use sketchroom::config::Config;
use sketchroom::error::Result;
use sketchroom::store::{
    ChatMessage, Element, MemoryStore, NewChatMessage, NewElement, NewUser, Room, RoomWithAdmin,
    SharedStore, Store, User,
};
use sketchroom::Error;
use std::sync::Arc;
use tower::ServiceExt;

pub const ACCESS_SECRET: &str = "test-access-secret-0123456789abcdef";
pub const REFRESH_SECRET: &str = "test-refresh-secret-0123456789abcdef";

/// Configuration with test secrets and the cheapest bcrypt cost
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.access_secret = ACCESS_SECRET.to_string();
    config.auth.refresh_secret = REFRESH_SECRET.to_string();
    config.auth.bcrypt_cost = 4;
    config
}

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub tokens: TokenService,
}

/// Store whose every operation fails, as an unreachable database would
pub struct FailingStore;

fn unavailable<T>() -> Result<T> {
    Err(Error::Other("store unavailable".to_string()))
}

#[async_trait]
impl Store for FailingStore {
    async fn create_user(&self, _user: NewUser) -> Result<User> {
        unavailable()
    }

    async fn find_user_by_id(&self, _id: &str) -> Result<Option<User>> {
        unavailable()
    }

    async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>> {
        unavailable()
    }

    async fn create_room(&self, _slug: &str, _admin_id: &str) -> Result<Room> {
        unavailable()
    }

    async fn find_room_by_slug(&self, _slug: &str) -> Result<Option<RoomWithAdmin>> {
        unavailable()
    }

    async fn create_chat(&self, _message: NewChatMessage) -> Result<ChatMessage> {
        unavailable()
    }

    async fn list_chats(&self, _room_id: i64, _limit: usize) -> Result<Vec<ChatMessage>> {
        unavailable()
    }

    async fn create_element(&self, _element: NewElement) -> Result<Element> {
        unavailable()
    }

    async fn list_elements(&self, _room_id: i64) -> Result<Vec<Element>> {
        unavailable()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        Self::build(Arc::new(store.clone()), store)
    }

    /// Router backed by [`FailingStore`]; `store` is left empty and unused
    pub fn failing() -> Self {
        Self::build(Arc::new(FailingStore), MemoryStore::new())
    }

    fn build(shared: SharedStore, store: MemoryStore) -> Self {
        let config = test_config();
        let state = Arc::new(AppState::new(&config, shared));

        Self {
            router: create_router(state),
            store,
            tokens: TokenService::new(&config.auth),
        }
    }

    /// Send a request and return status plus parsed JSON body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router should not fail");

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).expect("Response body is not JSON")
        };
        (status, json)
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
        token: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Sign up and return the new user's id
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> String {
        let (status, json) = self
            .post_json(
                "/signup",
                serde_json::json!({ "username": email, "password": password, "name": name }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "signup failed: {}", json);
        json["userId"].as_str().expect("userId missing").to_string()
    }

    /// Sign in and return the full response body
    pub async fn signin(&self, email: &str, password: &str) -> serde_json::Value {
        let (status, json) = self
            .post_json(
                "/signin",
                serde_json::json!({ "username": email, "password": password }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "signin failed: {}", json);
        json
    }

    /// Sign up, sign in and return (user id, access token)
    pub async fn login(&self, email: &str, name: &str) -> (String, String) {
        let user_id = self.signup(email, "password123", name).await;
        let json = self.signin(email, "password123").await;
        let token = json["accessToken"].as_str().unwrap().to_string();
        (user_id, token)
    }
}
