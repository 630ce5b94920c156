//! Raw `{ "type", "data" }` envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::InboundMessage;
use crate::error::CollabError;

/// A decoded frame before its payload is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message kind
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific payload
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Create an envelope
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }

    /// Interpret the payload.
    ///
    /// Returns `Ok(None)` for kinds this client does not understand and an
    /// error when a known kind carries a payload of the wrong shape. A
    /// missing payload is read as `{}`.
    pub fn to_inbound(&self) -> Result<Option<InboundMessage>, CollabError> {
        if !InboundMessage::is_known_kind(&self.kind) {
            return Ok(None);
        }
        let data = match &self.data {
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        };
        let mut framed = Map::with_capacity(2);
        framed.insert("type".to_string(), Value::String(self.kind.clone()));
        framed.insert("data".to_string(), data);
        serde_json::from_value(Value::Object(framed))
            .map(Some)
            .map_err(CollabError::Decode)
    }
}
