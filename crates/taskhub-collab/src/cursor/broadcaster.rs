//! Cursor broadcaster: one live cursor per remote user.

use taskhub_core::types::UserId;

use super::position::{CursorPosition, Position, Selection};
use crate::message::types::OutboundMessage;

/// Latest cursor per remote user.
///
/// Updates are last-received-wins: the sender's timestamp is carried but
/// never compared.
#[derive(Debug, Default, Clone)]
pub struct CursorBroadcaster {
    cursors: Vec<CursorPosition>,
}

impl CursorBroadcaster {
    /// Create an empty broadcaster
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the cursor for `cursor.user_id`.
    pub fn apply_cursor_update(&mut self, cursor: CursorPosition) {
        match self.cursors.iter_mut().find(|c| c.user_id == cursor.user_id) {
            Some(existing) => *existing = cursor,
            None => self.cursors.push(cursor),
        }
    }

    /// Replace every cursor with a server snapshot.
    ///
    /// When the snapshot repeats a user id the later entry wins.
    pub fn replace_all(&mut self, cursors: Vec<CursorPosition>) {
        self.cursors.clear();
        for cursor in cursors {
            self.apply_cursor_update(cursor);
        }
    }

    /// Drop the cursor of a user. Returns whether one was present.
    pub fn remove_for_user(&mut self, user_id: &UserId) -> bool {
        let before = self.cursors.len();
        self.cursors.retain(|c| &c.user_id != user_id);
        self.cursors.len() < before
    }

    /// Cursor of one user, if known
    pub fn get(&self, user_id: &UserId) -> Option<&CursorPosition> {
        self.cursors.iter().find(|c| &c.user_id == user_id)
    }

    /// All cursors in first-seen order
    pub fn cursors(&self) -> &[CursorPosition] {
        &self.cursors
    }

    /// Number of tracked cursors
    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    /// Whether no cursor is tracked
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    /// Forget every cursor
    pub fn clear(&mut self) {
        self.cursors.clear();
    }

    /// Package the local cursor for sending.
    pub fn cursor_message(
        position: Position,
        selection: Option<Selection>,
        file_path: Option<String>,
    ) -> OutboundMessage {
        OutboundMessage::CursorUpdate {
            position,
            selection,
            file_path,
        }
    }
}
