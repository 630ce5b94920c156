//! Presence status definitions.

use serde::{Deserialize, Serialize};

/// User presence status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    /// User is connected and recently interacted.
    #[default]
    Active,
    /// User is connected but idle.
    Idle,
    /// User is not connected.
    Offline,
}

impl PresenceStatus {
    /// Parses from a string with a default fallback.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "active" | "online" => Self::Active,
            "idle" | "away" => Self::Idle,
            "offline" => Self::Offline,
            _ => Self::Active,
        }
    }

    /// Converts to string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Idle => "idle",
            Self::Offline => "offline",
        }
    }
}
