//! Edit operation wire types.

use serde::{Deserialize, Serialize};
use taskhub_core::types::{DocumentId, UserId};

/// A single edit against a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditOperation {
    /// Insert `content` at `position`.
    Insert { position: usize, content: String },
    /// Delete `length` characters starting at `position`.
    Delete { position: usize, length: usize },
    /// Replace `length` characters at `position` with `content`.
    Replace {
        position: usize,
        length: usize,
        content: String,
    },
}

impl EditOperation {
    /// Offset the operation applies at
    pub fn position(&self) -> usize {
        match self {
            Self::Insert { position, .. }
            | Self::Delete { position, .. }
            | Self::Replace { position, .. } => *position,
        }
    }

    /// Operation kind as it appears on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Delete { .. } => "delete",
            Self::Replace { .. } => "replace",
        }
    }
}

/// An edit made by another participant, as delivered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpdate {
    pub document_id: DocumentId,
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: String,
    /// Per-document version assigned by the server
    #[serde(default)]
    pub version: u64,
    pub operation: EditOperation,
}
