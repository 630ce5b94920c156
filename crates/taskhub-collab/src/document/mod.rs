//! Document edit operation relay.
//!
//! Operations are forwarded in both directions unchanged. Version numbers
//! travel with them but nothing here orders, merges or validates them.

pub mod operation;
pub mod relay;

pub use operation::{DocumentUpdate, EditOperation};
pub use relay::DocumentRelay;
