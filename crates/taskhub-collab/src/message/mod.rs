//! Collaboration message types, framing, and routing.

pub mod envelope;
pub mod router;
pub mod serializer;
pub(crate) mod timestamp;
pub mod types;

pub use envelope::Envelope;
pub use router::{Routed, route_frame};
pub use types::{InboundMessage, OutboundMessage};
