//! Events published by a collaboration session to its host.

use taskhub_core::types::{UserId, WorkspaceId};
use tokio::sync::mpsc;
use tracing::warn;

use crate::cursor::position::CursorPosition;
use crate::document::operation::DocumentUpdate;
use crate::message::envelope::Envelope;
use crate::presence::activity::ActivityEvent;
use crate::presence::user::User;
use crate::typing::debouncer::TypingUser;

/// Something the host may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The socket opened.
    Opened,
    /// The socket closed (for any reason).
    Closed,
    /// The socket failed or could not be opened.
    Error(String),
    /// A decoded inbound frame, before routing.
    Message(Envelope),
    /// The server assigned this session a cursor color.
    CursorColorAssigned(String),
    /// The roster was replaced by a server snapshot.
    RosterReplaced(Vec<User>),
    /// A user joined.
    UserJoined(User),
    /// A user left.
    UserLeft(UserId),
    /// A user went idle or came back.
    UserIdle { user_id: UserId, idle: bool },
    /// The cursor list was replaced by a server snapshot.
    CursorsReplaced(Vec<CursorPosition>),
    /// A remote cursor moved.
    CursorMoved(CursorPosition),
    /// A remote document edit, verbatim.
    DocumentUpdated(DocumentUpdate),
    /// A remote activity notice.
    Activity(ActivityEvent),
    /// The set of typing users changed; carries the new set.
    TypingChanged(Vec<TypingUser>),
    /// Heartbeat acknowledged.
    Pong,
}

impl SessionEvent {
    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Error(_) => "error",
            Self::Message(_) => "message",
            Self::CursorColorAssigned(_) => "cursor_color_assigned",
            Self::RosterReplaced(_) => "roster_replaced",
            Self::UserJoined(_) => "user_joined",
            Self::UserLeft(_) => "user_left",
            Self::UserIdle { .. } => "user_idle",
            Self::CursorsReplaced(_) => "cursors_replaced",
            Self::CursorMoved(_) => "cursor_moved",
            Self::DocumentUpdated(_) => "document_updated",
            Self::Activity(_) => "activity",
            Self::TypingChanged(_) => "typing_changed",
            Self::Pong => "pong",
        }
    }
}

/// Non-blocking publisher for session events.
///
/// A slow host never stalls the session: when the channel is full the
/// event is dropped with a warning, and a dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct EventSink {
    workspace_id: WorkspaceId,
    sender: mpsc::Sender<SessionEvent>,
}

impl EventSink {
    /// Create a sink and its receiving half.
    pub fn channel(
        workspace_id: WorkspaceId,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<SessionEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (
            Self {
                workspace_id,
                sender,
            },
            receiver,
        )
    }

    /// Publish one event
    pub fn emit(&self, event: SessionEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(
                    workspace_id = %self.workspace_id,
                    kind = event.kind(),
                    "Session event buffer full, dropping event"
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }

    /// Publish events in order
    pub fn emit_all(&self, events: impl IntoIterator<Item = SessionEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}
