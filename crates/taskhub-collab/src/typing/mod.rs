//! Typing indicators with per-user expiry.

pub mod debouncer;

pub use debouncer::{TypingDebouncer, TypingIndicator, TypingUser, typing_message};
