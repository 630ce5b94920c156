//! Session metrics.

pub mod connections;
pub mod messages;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Per-session counters.
#[derive(Debug, Default)]
pub struct SessionMetrics {
    /// Frames written to the socket
    pub frames_sent: AtomicU64,
    /// Frames read from the socket
    pub frames_received: AtomicU64,
    /// Outbound messages discarded because the socket was not open
    pub frames_dropped: AtomicU64,
    /// Inbound frames that could not be decoded
    pub decode_errors: AtomicU64,
    /// Connections successfully opened
    pub connections_opened: AtomicU64,
    /// Automatic reconnect attempts scheduled
    pub reconnect_attempts: AtomicU64,
    /// Heartbeat pings written
    pub heartbeats_sent: AtomicU64,
}

impl SessionMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            reconnect_attempts: self.reconnect_attempts.load(Ordering::Relaxed),
            heartbeats_sent: self.heartbeats_sent.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Frames written to the socket
    pub frames_sent: u64,
    /// Frames read from the socket
    pub frames_received: u64,
    /// Outbound messages discarded while closed
    pub frames_dropped: u64,
    /// Undecodable inbound frames
    pub decode_errors: u64,
    /// Connections successfully opened
    pub connections_opened: u64,
    /// Automatic reconnect attempts scheduled
    pub reconnect_attempts: u64,
    /// Heartbeat pings written
    pub heartbeats_sent: u64,
}
