//! Real-time collaboration client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Collaboration session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollabConfig {
    /// Base URL of the collaboration service (`ws://` or `wss://`).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Fixed delay between automatic reconnect attempts, in milliseconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// How long one connection attempt may take before it counts as failed.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Maximum automatic reconnect attempts before giving up.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Heartbeat ping interval in seconds.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// How long a remote user stays "typing" without a refresh, in milliseconds.
    #[serde(default = "default_typing_timeout")]
    pub typing_timeout_ms: u64,
    /// Capacity of the session event channel.
    #[serde(default = "default_buffer")]
    pub event_buffer_size: usize,
}

impl Default for CollabConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            reconnect_delay_ms: default_reconnect_delay(),
            connect_timeout_ms: default_connect_timeout(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            heartbeat_interval_seconds: default_heartbeat_interval(),
            typing_timeout_ms: default_typing_timeout(),
            event_buffer_size: default_buffer(),
        }
    }
}

impl CollabConfig {
    /// Delay between reconnect attempts.
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Upper bound on a single connection attempt.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Interval between heartbeat pings.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_seconds)
    }

    /// Typing indicator expiry window.
    pub fn typing_timeout(&self) -> Duration {
        Duration::from_millis(self.typing_timeout_ms)
    }

    /// Checks the settings a session cannot run without.
    pub fn validate(&self) -> Result<(), AppError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(AppError::configuration("collab.base_url must not be empty"));
        }
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(AppError::configuration(format!(
                "collab.base_url must use ws:// or wss://, got '{url}'"
            )));
        }
        if self.connect_timeout_ms == 0 {
            return Err(AppError::configuration(
                "collab.connect_timeout_ms must be greater than zero",
            ));
        }
        if self.heartbeat_interval_seconds == 0 {
            return Err(AppError::configuration(
                "collab.heartbeat_interval_seconds must be greater than zero",
            ));
        }
        if self.typing_timeout_ms == 0 {
            return Err(AppError::configuration(
                "collab.typing_timeout_ms must be greater than zero",
            ));
        }
        if self.event_buffer_size == 0 {
            return Err(AppError::configuration(
                "collab.event_buffer_size must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "ws://localhost:8000/ws".to_string()
}

fn default_reconnect_delay() -> u64 {
    3000
}

fn default_connect_timeout() -> u64 {
    10_000
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_heartbeat_interval() -> u64 {
    30
}

fn default_typing_timeout() -> u64 {
    3000
}

fn default_buffer() -> usize {
    256
}
