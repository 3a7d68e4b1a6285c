//! In-memory store for tests and local runs

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    ChatMessage, Element, NewChatMessage, NewElement, NewUser, Room, RoomWithAdmin, Store, User,
    UserSummary,
};
use crate::error::{Error, Result};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    rooms: Vec<Room>,
    chats: Vec<ChatRow>,
    elements: Vec<ElementRow>,
    next_room_id: i64,
    next_chat_id: i64,
    next_element_id: i64,
}

struct ChatRow {
    id: i64,
    room_id: i64,
    user_id: String,
    message: String,
}

struct ElementRow {
    id: i64,
    element: NewElement,
}

impl Tables {
    fn summary(&self, user_id: &str) -> Result<UserSummary> {
        self.users
            .get(user_id)
            .map(|user| UserSummary {
                id: user.id.clone(),
                name: user.name.clone(),
            })
            .ok_or_else(|| Error::Other(format!("User '{}' does not exist", user_id)))
    }

    fn require_room(&self, room_id: i64) -> Result<()> {
        if self.rooms.iter().any(|room| room.id == room_id) {
            Ok(())
        } else {
            Err(Error::Other(format!("Room {} does not exist", room_id)))
        }
    }

    fn chat(&self, row: &ChatRow) -> Result<ChatMessage> {
        Ok(ChatMessage {
            id: row.id,
            room_id: row.room_id,
            message: row.message.clone(),
            user_id: row.user_id.clone(),
            user: self.summary(&row.user_id)?,
        })
    }

    fn element(&self, row: &ElementRow) -> Result<Element> {
        Ok(Element {
            id: row.id,
            room_id: row.element.room_id,
            user_id: row.element.user_id.clone(),
            kind: row.element.kind.clone(),
            data: row.element.data.clone(),
            timestamp: row.element.timestamp,
            user: self.summary(&row.element.user_id)?,
        })
    }
}

/// Store backed by process memory
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
        }
    }

    /// Number of stored users
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    /// Number of stored rooms
    pub async fn room_count(&self) -> usize {
        self.tables.read().await.rooms.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(Error::UserAlreadyExists(user.email));
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: user.email,
            password: user.password_hash,
            name: user.name,
            created_at: chrono::Utc::now(),
        };
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_room(&self, slug: &str, admin_id: &str) -> Result<Room> {
        let mut tables = self.tables.write().await;
        if tables.rooms.iter().any(|room| room.slug == slug) {
            return Err(Error::RoomAlreadyExists(slug.to_string()));
        }
        tables.summary(admin_id)?;

        tables.next_room_id += 1;
        let room = Room {
            id: tables.next_room_id,
            slug: slug.to_string(),
            created_at: chrono::Utc::now(),
            admin_id: admin_id.to_string(),
        };
        tables.rooms.push(room.clone());
        Ok(room)
    }

    async fn find_room_by_slug(&self, slug: &str) -> Result<Option<RoomWithAdmin>> {
        let tables = self.tables.read().await;
        let Some(room) = tables.rooms.iter().find(|room| room.slug == slug) else {
            return Ok(None);
        };

        Ok(Some(RoomWithAdmin {
            admin: tables.summary(&room.admin_id)?,
            room: room.clone(),
        }))
    }

    async fn create_chat(&self, message: NewChatMessage) -> Result<ChatMessage> {
        let mut tables = self.tables.write().await;
        tables.require_room(message.room_id)?;
        tables.summary(&message.user_id)?;

        tables.next_chat_id += 1;
        let row = ChatRow {
            id: tables.next_chat_id,
            room_id: message.room_id,
            user_id: message.user_id,
            message: message.message,
        };
        let chat = tables.chat(&row)?;
        tables.chats.push(row);
        Ok(chat)
    }

    async fn list_chats(&self, room_id: i64, limit: usize) -> Result<Vec<ChatMessage>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&ChatRow> = tables
            .chats
            .iter()
            .filter(|row| row.room_id == room_id)
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));

        rows.into_iter()
            .take(limit)
            .map(|row| tables.chat(row))
            .collect()
    }

    async fn create_element(&self, element: NewElement) -> Result<Element> {
        let mut tables = self.tables.write().await;
        tables.require_room(element.room_id)?;
        tables.summary(&element.user_id)?;

        tables.next_element_id += 1;
        let row = ElementRow {
            id: tables.next_element_id,
            element,
        };
        let created = tables.element(&row)?;
        tables.elements.push(row);
        Ok(created)
    }

    async fn list_elements(&self, room_id: i64) -> Result<Vec<Element>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&ElementRow> = tables
            .elements
            .iter()
            .filter(|row| row.element.room_id == room_id)
            .collect();
        rows.sort_by(|a, b| {
            a.element
                .timestamp
                .cmp(&b.element.timestamp)
                .then(a.id.cmp(&b.id))
        });

        rows.into_iter().map(|row| tables.element(row)).collect()
    }
}
