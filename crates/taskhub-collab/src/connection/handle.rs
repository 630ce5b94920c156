//! Caller-facing handle to a collaboration session.

use std::sync::Arc;

use taskhub_core::types::{DocumentId, UserId, WorkspaceId};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use super::manager::Command;
use super::state::ConnectionState;
use crate::cursor::broadcaster::CursorBroadcaster;
use crate::cursor::position::{CursorPosition, Position, Selection};
use crate::document::operation::EditOperation;
use crate::document::relay::DocumentRelay;
use crate::error::{CollabError, CollabResult};
use crate::message::envelope::Envelope;
use crate::message::types::OutboundMessage;
use crate::metrics::{SessionMetrics, messages};
use crate::presence::activity::activity_message;
use crate::presence::user::User;
use crate::state::CollabSnapshot;
use crate::typing::debouncer::{TypingUser, typing_message};

/// A cheap, cloneable handle to one workspace session.
///
/// Nothing here waits on the network. Outbound messages are written only
/// while the session is connected; otherwise they are dropped with a
/// warning and never queued.
#[derive(Debug, Clone)]
pub struct CollabHandle {
    workspace_id: WorkspaceId,
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<CollabSnapshot>,
    metrics: Arc<SessionMetrics>,
}

impl CollabHandle {
    pub(crate) fn new(
        workspace_id: WorkspaceId,
        commands: mpsc::UnboundedSender<Command>,
        snapshot: watch::Receiver<CollabSnapshot>,
        metrics: Arc<SessionMetrics>,
    ) -> Self {
        Self {
            workspace_id,
            commands,
            snapshot,
            metrics,
        }
    }

    /// Send a message to the workspace.
    pub fn send(&self, message: OutboundMessage) {
        let state = self.state();
        if !state.is_connected() {
            warn!(
                workspace_id = %self.workspace_id,
                kind = message.kind(),
                state = %state,
                "Not connected; dropping outbound message"
            );
            messages::record_dropped(&self.metrics);
            return;
        }
        if self.command(Command::Send(message)).is_err() {
            messages::record_dropped(&self.metrics);
        }
    }

    /// Broadcast the local cursor.
    pub fn update_cursor(
        &self,
        position: Position,
        selection: Option<Selection>,
        file_path: Option<String>,
    ) {
        self.send(CursorBroadcaster::cursor_message(position, selection, file_path));
    }

    /// Send a local document edit.
    pub fn send_operation(&self, document_id: DocumentId, operation: EditOperation) {
        self.send(DocumentRelay::operation_message(document_id, operation));
    }

    /// Announce what the local user is doing.
    pub fn send_activity(&self, activity: impl Into<String>, details: Option<serde_json::Value>) {
        self.send(activity_message(activity, details));
    }

    /// Tell others the local user started or stopped typing.
    pub fn set_typing(&self, is_typing: bool, location: Option<String>) {
        self.send(typing_message(is_typing, location));
    }

    /// Ask the server to resend the roster and cursor snapshots.
    pub fn request_sync(&self) {
        self.send(OutboundMessage::RequestSync {});
    }

    /// Drop the current connection, reset the retry budget and connect again.
    pub fn reconnect(&self) -> CollabResult<()> {
        self.command(Command::Reconnect)
    }

    /// Close the connection and stop reconnecting.
    pub fn disconnect(&self) -> CollabResult<()> {
        self.command(Command::Disconnect)
    }

    pub(crate) fn shutdown(&self) -> CollabResult<()> {
        self.command(Command::Shutdown)
    }

    fn command(&self, command: Command) -> CollabResult<()> {
        self.commands.send(command).map_err(|_| {
            debug!(workspace_id = %self.workspace_id, "Session task is gone");
            CollabError::SessionClosed
        })
    }

    /// Workspace this session is joined to
    pub fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.snapshot.borrow().state
    }

    /// Whether outbound messages will be written
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Copy of everything the session currently knows
    pub fn snapshot(&self) -> CollabSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn watch(&self) -> watch::Receiver<CollabSnapshot> {
        self.snapshot.clone()
    }

    /// Most recent decoded inbound frame
    pub fn last_message(&self) -> Option<Envelope> {
        self.snapshot.borrow().last_message.clone()
    }

    /// Cursor color assigned by the server, once known
    pub fn cursor_color(&self) -> Option<String> {
        self.snapshot.borrow().cursor_color.clone()
    }

    /// Local user id, when the server reported it on connect
    pub fn local_user_id(&self) -> Option<UserId> {
        self.snapshot.borrow().local_user_id.clone()
    }

    /// Current workspace roster
    pub fn users(&self) -> Vec<User> {
        self.snapshot.borrow().users.clone()
    }

    /// Latest cursor of each remote user
    pub fn cursors(&self) -> Vec<CursorPosition> {
        self.snapshot.borrow().cursors.clone()
    }

    /// Remote users currently typing
    pub fn typing_users(&self) -> Vec<TypingUser> {
        self.snapshot.borrow().typing.clone()
    }

    /// Consecutive failed connection attempts
    pub fn reconnect_attempts(&self) -> u32 {
        self.snapshot.borrow().reconnect_attempts
    }

    /// Session counters
    pub fn metrics(&self) -> &Arc<SessionMetrics> {
        &self.metrics
    }
}
