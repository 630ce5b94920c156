//! Connection metrics helpers.

use std::sync::atomic::Ordering;

use super::SessionMetrics;

/// Record a successfully opened connection
pub fn record_open(metrics: &SessionMetrics) {
    metrics.connections_opened.fetch_add(1, Ordering::Relaxed);
}

/// Record a scheduled reconnect attempt
pub fn record_reconnect_attempt(metrics: &SessionMetrics) {
    metrics.reconnect_attempts.fetch_add(1, Ordering::Relaxed);
}
