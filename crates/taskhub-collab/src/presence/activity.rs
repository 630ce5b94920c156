//! Activity notifications ("Ada opened the roadmap board").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskhub_core::types::UserId;

use crate::message::types::OutboundMessage;

/// A transient activity notice from another participant.
///
/// Delivered to the host once and never retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Acting user
    pub user_id: UserId,
    /// Acting user's display name
    #[serde(default)]
    pub user_name: String,
    /// Free-form activity label
    pub activity: String,
    /// Optional structured detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// When the activity happened
    #[serde(default = "Utc::now", deserialize_with = "crate::message::timestamp::lenient")]
    pub timestamp: DateTime<Utc>,
}

/// Build an outbound activity notice
pub fn activity_message(
    activity: impl Into<String>,
    details: Option<serde_json::Value>,
) -> OutboundMessage {
    OutboundMessage::ActivityUpdate {
        activity: activity.into(),
        details,
    }
}
