//! Typing debouncer.
//!
//! Each typing user owns exactly one timer in a [`DelayQueue`]. A repeated
//! "is typing" signal resets that timer; "stopped typing" removes it. When
//! a timer fires the user is dropped from the set.

use std::future::{pending, poll_fn};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use taskhub_core::types::UserId;
use tokio_util::time::{DelayQueue, delay_queue};
use tracing::debug;

use crate::message::types::OutboundMessage;

/// Inbound typing signal from another participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingIndicator {
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: String,
    pub is_typing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// A user currently shown as typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingUser {
    pub user_id: UserId,
    pub user_name: String,
    pub location: Option<String>,
}

#[derive(Debug)]
struct Entry {
    user: TypingUser,
    key: delay_queue::Key,
}

/// Set of typing users, each with an independent expiry timer.
#[derive(Debug)]
pub struct TypingDebouncer {
    window: Duration,
    timers: DelayQueue<UserId>,
    entries: Vec<Entry>,
}

impl TypingDebouncer {
    /// Create a debouncer whose entries expire after `window` without a refresh.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            timers: DelayQueue::new(),
            entries: Vec::new(),
        }
    }

    /// Apply a typing signal. Returns `true` if the visible set changed.
    ///
    /// # Panics
    ///
    /// Starting a timer needs a Tokio runtime with the time driver enabled;
    /// calling this outside one panics.
    pub fn apply_typing(&mut self, signal: TypingIndicator) -> bool {
        if !signal.is_typing {
            return self.remove(&signal.user_id);
        }

        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.user.user_id == signal.user_id)
        {
            self.timers.reset(&entry.key, self.window);
            let changed =
                entry.user.location != signal.location || entry.user.user_name != signal.user_name;
            entry.user.location = signal.location;
            entry.user.user_name = signal.user_name;
            return changed;
        }

        let key = self.timers.insert(signal.user_id.clone(), self.window);
        self.entries.push(Entry {
            user: TypingUser {
                user_id: signal.user_id,
                user_name: signal.user_name,
                location: signal.location,
            },
            key,
        });
        true
    }

    /// Drop a user and cancel their timer. Returns whether they were typing.
    pub fn remove(&mut self, user_id: &UserId) -> bool {
        let Some(index) = self.entries.iter().position(|e| &e.user.user_id == user_id) else {
            return false;
        };
        let entry = self.entries.remove(index);
        self.timers.remove(&entry.key);
        true
    }

    /// Wait for the next user whose window elapsed and drop them.
    ///
    /// Never resolves while nobody is typing. Cancel-safe.
    pub async fn next_expired(&mut self) -> UserId {
        if self.timers.is_empty() {
            return pending().await;
        }
        match poll_fn(|cx| self.timers.poll_expired(cx)).await {
            Some(expired) => {
                let user_id = expired.into_inner();
                self.entries.retain(|e| e.user.user_id != user_id);
                debug!(user_id = %user_id, "Typing indicator expired");
                user_id
            }
            None => pending().await,
        }
    }

    /// Cancel every outstanding timer and empty the set.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.entries.clear();
    }

    /// Whether `user_id` is currently shown as typing.
    pub fn is_typing(&self, user_id: &UserId) -> bool {
        self.entries.iter().any(|e| &e.user.user_id == user_id)
    }

    /// Users currently typing, in the order they started.
    pub fn users(&self) -> Vec<TypingUser> {
        self.entries.iter().map(|e| e.user.clone()).collect()
    }

    /// Number of users typing
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nobody is typing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expiry window applied to each signal
    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Build the outbound local typing signal
pub fn typing_message(is_typing: bool, location: Option<String>) -> OutboundMessage {
    OutboundMessage::TypingIndicator {
        is_typing,
        location,
    }
}
