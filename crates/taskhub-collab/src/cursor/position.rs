//! Cursor and selection coordinates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskhub_core::types::UserId;

/// A line/column location in a text document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based line
    pub line: u32,
    /// Zero-based column
    #[serde(alias = "col", default)]
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A selected range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
}

/// The latest known cursor of a remote participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorPosition {
    /// Owner of the cursor
    pub user_id: UserId,
    /// Owner's display name
    #[serde(default)]
    pub user_name: String,
    /// Render color assigned by the server
    #[serde(default, alias = "cursor_color")]
    pub color: String,
    /// Caret location
    pub position: Position,
    /// Selected range, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
    /// File the cursor is in, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// When the sender produced the update
    #[serde(default = "Utc::now", deserialize_with = "crate::message::timestamp::lenient")]
    pub timestamp: DateTime<Utc>,
}
