//! PostgreSQL-backed store

use async_trait::async_trait;
use std::sync::Arc;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Row};

use super::{
    ChatMessage, Element, NewChatMessage, NewElement, NewUser, Room, RoomWithAdmin, Store, User,
    UserSummary,
};
use crate::error::{Error, Result};

/// Idempotent schema for all tables the service reads and writes
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          TEXT PRIMARY KEY,
    email       TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,
    name        TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS rooms (
    id          BIGSERIAL PRIMARY KEY,
    slug        TEXT NOT NULL UNIQUE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    admin_id    TEXT NOT NULL REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS chats (
    id          BIGSERIAL PRIMARY KEY,
    room_id     BIGINT NOT NULL REFERENCES rooms(id),
    user_id     TEXT NOT NULL REFERENCES users(id),
    message     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS chats_room_id_idx ON chats (room_id, id DESC);

CREATE TABLE IF NOT EXISTS elements (
    id          BIGSERIAL PRIMARY KEY,
    room_id     BIGINT NOT NULL REFERENCES rooms(id),
    user_id     TEXT NOT NULL REFERENCES users(id),
    kind        TEXT NOT NULL,
    data        JSONB NOT NULL,
    "timestamp" TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS elements_room_id_idx ON elements (room_id, "timestamp");
"#;

/// Store backed by a single pipelined PostgreSQL connection
#[derive(Clone)]
pub struct PostgresStore {
    client: Arc<Client>,
}

impl PostgresStore {
    /// Connect using a libpq-style or URL connection string
    pub async fn connect(conn_string: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(conn_string, NoTls).await?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Create tables and indexes if they do not exist yet
    pub async fn migrate(&self) -> Result<()> {
        self.client.batch_execute(SCHEMA).await?;
        tracing::info!("Database schema is up to date");
        Ok(())
    }
}

fn is_unique_violation(err: &tokio_postgres::Error) -> bool {
    err.code() == Some(&SqlState::UNIQUE_VIOLATION)
}

fn user_from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        password: row.get("password"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

fn room_from_row(row: &Row) -> Room {
    Room {
        id: row.get("id"),
        slug: row.get("slug"),
        created_at: row.get("created_at"),
        admin_id: row.get("admin_id"),
    }
}

fn chat_from_row(row: &Row) -> ChatMessage {
    let user_id: String = row.get("user_id");
    ChatMessage {
        id: row.get("id"),
        room_id: row.get("room_id"),
        message: row.get("message"),
        user: UserSummary {
            id: user_id.clone(),
            name: row.get("user_name"),
        },
        user_id,
    }
}

fn element_from_row(row: &Row) -> Element {
    let user_id: String = row.get("user_id");
    Element {
        id: row.get("id"),
        room_id: row.get("room_id"),
        kind: row.get("kind"),
        data: row.get("data"),
        timestamp: row.get("timestamp"),
        user: UserSummary {
            id: user_id.clone(),
            name: row.get("user_name"),
        },
        user_id,
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let id = uuid::Uuid::new_v4().to_string();
        let row = self
            .client
            .query_one(
                "INSERT INTO users (id, email, password, name) VALUES ($1, $2, $3, $4) \
                 RETURNING id, email, password, name, created_at",
                &[&id, &user.email, &user.password_hash, &user.name],
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::UserAlreadyExists(user.email.clone())
                } else {
                    Error::Database(e)
                }
            })?;

        Ok(user_from_row(&row))
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let row = self
            .client
            .query_opt(
                "SELECT id, email, password, name, created_at FROM users WHERE id = $1",
                &[&id],
            )
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = self
            .client
            .query_opt(
                "SELECT id, email, password, name, created_at FROM users WHERE email = $1",
                &[&email],
            )
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn create_room(&self, slug: &str, admin_id: &str) -> Result<Room> {
        let row = self
            .client
            .query_one(
                "INSERT INTO rooms (slug, admin_id) VALUES ($1, $2) \
                 RETURNING id, slug, created_at, admin_id",
                &[&slug, &admin_id],
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::RoomAlreadyExists(slug.to_string())
                } else {
                    Error::Database(e)
                }
            })?;

        Ok(room_from_row(&row))
    }

    async fn find_room_by_slug(&self, slug: &str) -> Result<Option<RoomWithAdmin>> {
        let row = self
            .client
            .query_opt(
                "SELECT r.id, r.slug, r.created_at, r.admin_id, u.name AS admin_name \
                 FROM rooms r JOIN users u ON u.id = r.admin_id \
                 WHERE r.slug = $1",
                &[&slug],
            )
            .await?;

        Ok(row.map(|row| {
            let room = room_from_row(&row);
            RoomWithAdmin {
                admin: UserSummary {
                    id: room.admin_id.clone(),
                    name: row.get("admin_name"),
                },
                room,
            }
        }))
    }

    async fn create_chat(&self, message: NewChatMessage) -> Result<ChatMessage> {
        let row = self
            .client
            .query_one(
                "WITH inserted AS ( \
                     INSERT INTO chats (room_id, user_id, message) VALUES ($1, $2, $3) \
                     RETURNING id, room_id, user_id, message \
                 ) \
                 SELECT i.id, i.room_id, i.user_id, i.message, u.name AS user_name \
                 FROM inserted i JOIN users u ON u.id = i.user_id",
                &[&message.room_id, &message.user_id, &message.message],
            )
            .await?;

        Ok(chat_from_row(&row))
    }

    async fn list_chats(&self, room_id: i64, limit: usize) -> Result<Vec<ChatMessage>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .client
            .query(
                "SELECT c.id, c.room_id, c.user_id, c.message, u.name AS user_name \
                 FROM chats c JOIN users u ON u.id = c.user_id \
                 WHERE c.room_id = $1 \
                 ORDER BY c.id DESC \
                 LIMIT $2",
                &[&room_id, &limit],
            )
            .await?;

        Ok(rows.iter().map(chat_from_row).collect())
    }

    async fn create_element(&self, element: NewElement) -> Result<Element> {
        let row = self
            .client
            .query_one(
                "WITH inserted AS ( \
                     INSERT INTO elements (room_id, user_id, kind, data, \"timestamp\") \
                     VALUES ($1, $2, $3, $4, $5) \
                     RETURNING id, room_id, user_id, kind, data, \"timestamp\" \
                 ) \
                 SELECT i.id, i.room_id, i.user_id, i.kind, i.data, i.\"timestamp\", \
                        u.name AS user_name \
                 FROM inserted i JOIN users u ON u.id = i.user_id",
                &[
                    &element.room_id,
                    &element.user_id,
                    &element.kind,
                    &element.data,
                    &element.timestamp,
                ],
            )
            .await?;

        Ok(element_from_row(&row))
    }

    async fn list_elements(&self, room_id: i64) -> Result<Vec<Element>> {
        let rows = self
            .client
            .query(
                "SELECT e.id, e.room_id, e.user_id, e.kind, e.data, e.\"timestamp\", \
                        u.name AS user_name \
                 FROM elements e JOIN users u ON u.id = e.user_id \
                 WHERE e.room_id = $1 \
                 ORDER BY e.\"timestamp\" ASC, e.id ASC",
                &[&room_id],
            )
            .await?;

        Ok(rows.iter().map(element_from_row).collect())
    }
}
