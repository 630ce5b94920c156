//! Session-owned collaboration state and its read-only snapshot.

use std::time::Duration;

use serde::Serialize;
use taskhub_core::types::UserId;

use crate::connection::state::ConnectionState;
use crate::cursor::broadcaster::CursorBroadcaster;
use crate::cursor::position::CursorPosition;
use crate::message::envelope::Envelope;
use crate::presence::tracker::PresenceTracker;
use crate::presence::user::User;
use crate::typing::debouncer::{TypingDebouncer, TypingUser};

/// Everything a session knows about its workspace.
///
/// Owned by the session task and mutated only by the message router and
/// the connection lifecycle; callers see it through [`CollabSnapshot`].
#[derive(Debug)]
pub struct CollabState {
    /// Socket lifecycle state
    pub connection: ConnectionState,
    /// Cursor color the server assigned to this session
    pub cursor_color: Option<String>,
    /// Local user id, when the server reports it
    pub local_user_id: Option<UserId>,
    /// Workspace roster
    pub presence: PresenceTracker,
    /// Remote cursors
    pub cursors: CursorBroadcaster,
    /// Remote typing indicators
    pub typing: TypingDebouncer,
    /// Most recent decoded inbound frame
    pub last_message: Option<Envelope>,
}

impl CollabState {
    /// Fresh, disconnected state
    pub fn new(typing_window: Duration) -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            cursor_color: None,
            local_user_id: None,
            presence: PresenceTracker::new(),
            cursors: CursorBroadcaster::new(),
            typing: TypingDebouncer::new(typing_window),
            last_message: None,
        }
    }

    /// Copy out the caller-visible view.
    pub fn snapshot(&self, reconnect_attempts: u32) -> CollabSnapshot {
        CollabSnapshot {
            state: self.connection,
            reconnect_attempts,
            cursor_color: self.cursor_color.clone(),
            local_user_id: self.local_user_id.clone(),
            users: self.presence.users().to_vec(),
            cursors: self.cursors.cursors().to_vec(),
            typing: self.typing.users(),
            last_message: self.last_message.clone(),
        }
    }
}

/// Read-only view of a session, republished after every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollabSnapshot {
    pub state: ConnectionState,
    pub reconnect_attempts: u32,
    pub cursor_color: Option<String>,
    pub local_user_id: Option<UserId>,
    pub users: Vec<User>,
    pub cursors: Vec<CursorPosition>,
    pub typing: Vec<TypingUser>,
    pub last_message: Option<Envelope>,
}

impl CollabSnapshot {
    /// Whether the socket is open
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Roster entry for one user
    pub fn user(&self, user_id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == user_id)
    }

    /// Latest cursor of one user
    pub fn cursor(&self, user_id: &UserId) -> Option<&CursorPosition> {
        self.cursors.iter().find(|c| &c.user_id == user_id)
    }
}
