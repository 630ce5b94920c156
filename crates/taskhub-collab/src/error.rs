//! Collaboration subsystem errors.

use taskhub_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Errors produced inside the collaboration layer.
///
/// None of these are fatal: the session task turns them into state
/// transitions and [`SessionEvent`](crate::SessionEvent)s.
#[derive(Debug, Error)]
pub enum CollabError {
    /// The socket could not be established.
    #[error("failed to connect to {url}: {reason}")]
    Connect {
        /// Target URL with credentials removed.
        url: String,
        /// Underlying transport failure.
        reason: String,
    },

    /// The established socket failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// An inbound frame could not be decoded.
    #[error("failed to decode frame: {0}")]
    Decode(#[source] serde_json::Error),

    /// An outbound message could not be encoded.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// The session configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The session task is no longer running.
    #[error("collaboration session has shut down")]
    SessionClosed,
}

/// Result alias for collaboration operations.
pub type CollabResult<T> = Result<T, CollabError>;

impl From<CollabError> for AppError {
    fn from(err: CollabError) -> Self {
        let kind = match &err {
            CollabError::Connect { .. } | CollabError::Transport(_) => ErrorKind::Transport,
            CollabError::Decode(_) | CollabError::Encode(_) => ErrorKind::Serialization,
            CollabError::InvalidConfig(_) => ErrorKind::Configuration,
            CollabError::SessionClosed => ErrorKind::ServiceUnavailable,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}

impl From<AppError> for CollabError {
    fn from(err: AppError) -> Self {
        Self::InvalidConfig(err.message)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CollabError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_maps_to_transport_kind() {
        let app: AppError = CollabError::Transport("reset by peer".into()).into();
        assert_eq!(app.kind, ErrorKind::Transport);
        assert!(app.message.contains("reset by peer"));
    }

    #[test]
    fn test_session_closed_maps_to_unavailable() {
        let app: AppError = CollabError::SessionClosed.into();
        assert_eq!(app.kind, ErrorKind::ServiceUnavailable);
    }
}
