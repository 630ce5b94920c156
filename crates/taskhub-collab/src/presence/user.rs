//! Roster entry for a user present in the workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskhub_core::types::UserId;

use super::status::PresenceStatus;

/// A user currently joined to the workspace collaboration channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: UserId,
    /// Display name
    #[serde(default, alias = "username", alias = "user_name")]
    pub name: String,
    /// Presence status
    #[serde(default)]
    pub status: PresenceStatus,
    /// When the user joined the session
    #[serde(default = "Utc::now", deserialize_with = "crate::message::timestamp::lenient")]
    pub joined_at: DateTime<Utc>,
    /// Last observed activity
    #[serde(default = "Utc::now", deserialize_with = "crate::message::timestamp::lenient")]
    pub last_activity: DateTime<Utc>,
    /// Cursor color assigned by the server for this session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_color: Option<String>,
}

impl User {
    /// Create an active user joined now.
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            status: PresenceStatus::Active,
            joined_at: now,
            last_activity: now,
            cursor_color: None,
        }
    }
}
