//! Presence tracker for the workspace roster.

use chrono::Utc;
use taskhub_core::types::UserId;
use tracing::debug;

use super::status::PresenceStatus;
use super::user::User;

/// Roster of users joined to the workspace, in order of arrival.
///
/// Never holds two entries with the same user id; removal is the only way
/// the roster shrinks.
#[derive(Debug, Default, Clone)]
pub struct PresenceTracker {
    users: Vec<User>,
}

impl PresenceTracker {
    /// Create an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user unless one with the same id is already present.
    ///
    /// Returns `true` if the roster changed. A duplicate join does not
    /// update the existing entry.
    pub fn apply_join(&mut self, user: User) -> bool {
        if self.contains(&user.id) {
            debug!(user_id = %user.id, "Ignoring duplicate join");
            return false;
        }
        self.users.push(user);
        true
    }

    /// Remove a user. Returns the removed entry, if any.
    pub fn apply_leave(&mut self, user_id: &UserId) -> Option<User> {
        let index = self.users.iter().position(|u| &u.id == user_id)?;
        Some(self.users.remove(index))
    }

    /// Transition an existing user between idle and active.
    ///
    /// Unknown user ids are ignored; this never creates entries.
    pub fn apply_idle(&mut self, user_id: &UserId, idle: bool) -> bool {
        let Some(user) = self.users.iter_mut().find(|u| &u.id == user_id) else {
            debug!(user_id = %user_id, "Idle update for unknown user ignored");
            return false;
        };
        user.status = if idle {
            PresenceStatus::Idle
        } else {
            PresenceStatus::Active
        };
        user.last_activity = Utc::now();
        true
    }

    /// Replace the whole roster with a server snapshot.
    ///
    /// Duplicate ids in the snapshot keep their first occurrence.
    pub fn replace_all(&mut self, users: Vec<User>) {
        self.users.clear();
        for user in users {
            self.apply_join(user);
        }
    }

    /// Look up a user by id
    pub fn get(&self, user_id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == user_id)
    }

    /// Whether a user is present
    pub fn contains(&self, user_id: &UserId) -> bool {
        self.users.iter().any(|u| &u.id == user_id)
    }

    /// Current roster in arrival order
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Number of users present
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the roster is empty
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.users.clear();
    }
}
