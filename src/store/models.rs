//! Records exchanged with the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    /// bcrypt hash, never the plaintext
    pub password: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

/// Public `{id, name}` projection joined onto rooms, chats and elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i64,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub admin_id: String,
}

/// A room together with its admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomWithAdmin {
    #[serde(flatten)]
    pub room: Room,
    pub admin: UserSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub room_id: i64,
    pub message: String,
    pub user_id: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub room_id: i64,
    pub user_id: String,
    pub message: String,
}

/// A drawing element placed on a room's canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: i64,
    pub room_id: i64,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub user: UserSummary,
}

#[derive(Debug, Clone)]
pub struct NewElement {
    pub room_id: i64,
    pub user_id: String,
    pub kind: String,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_with_admin_is_flattened() {
        let room = RoomWithAdmin {
            room: Room {
                id: 7,
                slug: "design-review".to_string(),
                created_at: Utc::now(),
                admin_id: "u-1".to_string(),
            },
            admin: UserSummary {
                id: "u-1".to_string(),
                name: "Alice".to_string(),
            },
        };

        let json = serde_json::to_value(&room).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["slug"], "design-review");
        assert_eq!(json["adminId"], "u-1");
        assert_eq!(json["admin"]["name"], "Alice");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_element_kind_serializes_as_type() {
        let element = Element {
            id: 1,
            room_id: 2,
            user_id: "u-1".to_string(),
            kind: "rect".to_string(),
            data: serde_json::json!({ "x": 1, "y": 2 }),
            timestamp: Utc::now(),
            user: UserSummary {
                id: "u-1".to_string(),
                name: "Alice".to_string(),
            },
        };

        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["type"], "rect");
        assert_eq!(json["roomId"], 2);
        assert_eq!(json["data"]["x"], 1);
        assert!(json.get("kind").is_none());
    }
}
