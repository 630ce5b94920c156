//! Ping heartbeat for an open connection.

use std::time::Duration;

use chrono::Utc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::message::types::OutboundMessage;

/// Periodic liveness tick.
///
/// Lives inside the open connection it belongs to, so closing the
/// connection cancels it.
#[derive(Debug)]
pub struct Heartbeat {
    interval: Interval,
}

impl Heartbeat {
    /// Start ticking; the first tick fires one `period` from now.
    pub fn start(period: Duration) -> Self {
        // tokio panics on a zero period
        let period = period.max(Duration::from_millis(1));
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// Wait for the next tick. Cancel-safe.
    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

/// Build a heartbeat ping stamped with the current time.
pub fn ping_message() -> OutboundMessage {
    OutboundMessage::Ping {
        timestamp: Utc::now().timestamp_millis(),
    }
}
