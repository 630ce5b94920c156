//! Message metrics helpers.

use std::sync::atomic::Ordering;

use super::SessionMetrics;

/// Record a frame written to the socket
pub fn record_sent(metrics: &SessionMetrics) {
    metrics.frames_sent.fetch_add(1, Ordering::Relaxed);
}

/// Record a frame read from the socket
pub fn record_received(metrics: &SessionMetrics) {
    metrics.frames_received.fetch_add(1, Ordering::Relaxed);
}

/// Record an outbound message dropped because the socket was not open
pub fn record_dropped(metrics: &SessionMetrics) {
    metrics.frames_dropped.fetch_add(1, Ordering::Relaxed);
}

/// Record an inbound frame that failed to decode
pub fn record_decode_error(metrics: &SessionMetrics) {
    metrics.decode_errors.fetch_add(1, Ordering::Relaxed);
}

/// Record a heartbeat ping
pub fn record_heartbeat(metrics: &SessionMetrics) {
    metrics.heartbeats_sent.fetch_add(1, Ordering::Relaxed);
}
