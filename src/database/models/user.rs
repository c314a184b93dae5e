//! Tracked user document.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A user the bot has seen, plus their operator role if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// User JID
    pub user_id: String,

    /// Last seen push name.
    #[serde(default)]
    pub name: Option<String>,

    /// Elevated operator privileges over the bot instance.
    #[serde(default)]
    pub is_bot_admin: bool,

    /// The registered owner (also a bot admin).
    #[serde(default)]
    pub is_owner: bool,

    /// Commands issued by this user.
    #[serde(default)]
    pub commands: i64,

    #[serde(default)]
    pub received_welcome: bool,
}

impl User {
    /// Create a new user record.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            name: None,
            is_bot_admin: false,
            is_owner: false,
            commands: 0,
            received_welcome: false,
        }
    }
}
