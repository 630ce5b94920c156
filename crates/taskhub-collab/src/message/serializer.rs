//! JSON framing for collaboration messages.

use super::envelope::Envelope;
use super::types::OutboundMessage;
use crate::error::CollabError;

/// Serialize an outbound message to a text frame
pub fn encode(message: &OutboundMessage) -> Result<String, CollabError> {
    serde_json::to_string(message).map_err(CollabError::Encode)
}

/// Deserialize a text frame into a raw envelope
pub fn decode(frame: &str) -> Result<Envelope, CollabError> {
    serde_json::from_str(frame).map_err(CollabError::Decode)
}
