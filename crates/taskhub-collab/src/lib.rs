//! # taskhub-collab
//!
//! Real-time collaboration client for TaskHub workspaces. Provides:
//!
//! - A persistent WebSocket session per workspace with heartbeat and
//!   bounded automatic reconnection
//! - Inbound message routing over a `{ "type", "data" }` JSON envelope
//! - Presence roster tracking (active/idle/offline)
//! - Remote cursor/selection tracking and local cursor broadcast
//! - Typing indicators with per-user expiry
//! - Pass-through relay of document edit operations
//!
//! Each session runs as a single task that owns all of its state; callers
//! talk to it through a [`CollabHandle`] and observe it through
//! [`SessionEvent`]s and [`CollabSnapshot`]s.

pub mod connection;
pub mod cursor;
pub mod document;
pub mod error;
pub mod event;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod registry;
pub mod session;
pub mod state;
pub mod typing;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::handle::CollabHandle;
pub use connection::state::ConnectionState;
pub use connection::transport::{Connector, Transport, WsConnector};
pub use error::{CollabError, CollabResult};
pub use event::SessionEvent;
pub use registry::SessionRegistry;
pub use session::CollabSession;
pub use state::CollabSnapshot;
