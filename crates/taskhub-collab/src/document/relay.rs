//! Pass-through relay between the host and the collaboration channel.

use taskhub_core::types::DocumentId;
use tracing::debug;

use super::operation::{DocumentUpdate, EditOperation};
use crate::event::SessionEvent;
use crate::message::types::OutboundMessage;

/// Relays document operations without interpreting them.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentRelay;

impl DocumentRelay {
    /// Package a local edit for sending.
    pub fn operation_message(document_id: DocumentId, operation: EditOperation) -> OutboundMessage {
        OutboundMessage::DocumentUpdate {
            document_id,
            operation,
        }
    }

    /// Hand a remote edit to the host unchanged.
    pub fn deliver(update: DocumentUpdate) -> SessionEvent {
        debug!(
            document_id = %update.document_id,
            user_id = %update.user_id,
            version = update.version,
            kind = update.operation.kind(),
            "Relaying remote document operation"
        );
        SessionEvent::DocumentUpdated(update)
    }
}
