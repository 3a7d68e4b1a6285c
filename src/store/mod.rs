//! Relational store for users, rooms, chats and elements

pub mod memory;
mod models;
pub mod postgres;

pub use memory::MemoryStore;
pub use models::*;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;

/// Most recent messages returned by a chat history query
pub const CHAT_HISTORY_LIMIT: usize = 1000;

/// Data store operations used by the HTTP handlers.
///
/// Uniqueness of user emails and room slugs is enforced here; violations are
/// reported as [`Error::UserAlreadyExists`](crate::error::Error::UserAlreadyExists)
/// and [`Error::RoomAlreadyExists`](crate::error::Error::RoomAlreadyExists).
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn create_room(&self, slug: &str, admin_id: &str) -> Result<Room>;

    async fn find_room_by_slug(&self, slug: &str) -> Result<Option<RoomWithAdmin>>;

    async fn create_chat(&self, message: NewChatMessage) -> Result<ChatMessage>;

    /// Newest messages first, at most `limit`
    async fn list_chats(&self, room_id: i64, limit: usize) -> Result<Vec<ChatMessage>>;

    async fn create_element(&self, element: NewElement) -> Result<Element>;

    /// Oldest elements first
    async fn list_elements(&self, room_id: i64) -> Result<Vec<Element>>;
}

pub type SharedStore = Arc<dyn Store>;

/// Open the store selected by the configuration
pub async fn connect(config: &Config) -> Result<SharedStore> {
    match config.database.url.as_deref().filter(|url| !url.trim().is_empty()) {
        Some(url) => {
            let store = PostgresStore::connect(url).await?;
            if config.database.migrate {
                store.migrate().await?;
            }
            tracing::info!("Connected to PostgreSQL store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("No database configured; using the in-memory store (data is lost on exit)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
