//! Inbound and outbound collaboration message type definitions.
//!
//! Every frame is `{ "type": <kind>, "data": <object> }` in both
//! directions.

use serde::{Deserialize, Serialize};
use taskhub_core::types::{DocumentId, UserId};

use crate::cursor::position::{CursorPosition, Position, Selection};
use crate::document::operation::{DocumentUpdate, EditOperation};
use crate::presence::activity::ActivityEvent;
use crate::presence::user::User;
use crate::typing::debouncer::TypingIndicator;

/// Messages sent by the server to this client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Handshake completed; carries this session's cursor color.
    ConnectionEstablished(ConnectionEstablished),
    /// Full roster snapshot.
    WorkspaceUsers(RosterSnapshot),
    /// Full cursor snapshot.
    CursorPositions(CursorSnapshot),
    /// A user joined the workspace.
    UserJoined(User),
    /// A user left the workspace.
    UserLeft(UserLeft),
    /// A remote cursor moved.
    CursorUpdate(CursorPosition),
    /// A remote document edit.
    DocumentUpdate(DocumentUpdate),
    /// A remote activity notice.
    ActivityUpdate(ActivityEvent),
    /// A remote user started or stopped typing.
    #[serde(alias = "typing_indicator")]
    UserTyping(TypingIndicator),
    /// A remote user went idle (or came back).
    UserIdle(UserIdle),
    /// Heartbeat acknowledgement.
    Pong(Pong),
}

impl InboundMessage {
    /// Every kind this client understands.
    pub const KINDS: &'static [&'static str] = &[
        "connection_established",
        "workspace_users",
        "cursor_positions",
        "user_joined",
        "user_left",
        "cursor_update",
        "document_update",
        "activity_update",
        "user_typing",
        "typing_indicator",
        "user_idle",
        "pong",
    ];

    /// Whether `kind` names a recognised inbound message.
    pub fn is_known_kind(kind: &str) -> bool {
        Self::KINDS.contains(&kind)
    }
}

/// Payload of `connection_established`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEstablished {
    pub cursor_color: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// Payload of `workspace_users`: either `{ "users": [...] }` or a bare list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RosterSnapshot {
    Wrapped { users: Vec<User> },
    Bare(Vec<User>),
}

impl RosterSnapshot {
    pub fn into_users(self) -> Vec<User> {
        match self {
            Self::Wrapped { users } | Self::Bare(users) => users,
        }
    }
}

/// Payload of `cursor_positions`: either `{ "cursors": [...] }` or a bare list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CursorSnapshot {
    Wrapped { cursors: Vec<CursorPosition> },
    Bare(Vec<CursorPosition>),
}

impl CursorSnapshot {
    pub fn into_cursors(self) -> Vec<CursorPosition> {
        match self {
            Self::Wrapped { cursors } | Self::Bare(cursors) => cursors,
        }
    }
}

/// Payload of `user_left`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLeft {
    pub user_id: UserId,
}

/// Payload of `user_idle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdle {
    pub user_id: UserId,
    #[serde(default = "default_true")]
    pub is_idle: bool,
}

/// Payload of `pong`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pong {
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Messages sent by this client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Heartbeat.
    Ping {
        /// Client time in epoch milliseconds.
        timestamp: i64,
    },
    /// Local cursor moved.
    CursorUpdate {
        position: Position,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selection: Option<Selection>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_path: Option<String>,
    },
    /// Local document edit.
    DocumentUpdate {
        document_id: DocumentId,
        operation: EditOperation,
    },
    /// Local activity notice.
    ActivityUpdate {
        activity: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<serde_json::Value>,
    },
    /// Local typing state.
    TypingIndicator {
        is_typing: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<String>,
    },
    /// Ask the server to resend roster and cursor snapshots.
    RequestSync {},
}

impl OutboundMessage {
    /// Kind as it appears in the envelope
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ping { .. } => "ping",
            Self::CursorUpdate { .. } => "cursor_update",
            Self::DocumentUpdate { .. } => "document_update",
            Self::ActivityUpdate { .. } => "activity_update",
            Self::TypingIndicator { .. } => "typing_indicator",
            Self::RequestSync {} => "request_sync",
        }
    }
}

fn default_true() -> bool {
    true
}
