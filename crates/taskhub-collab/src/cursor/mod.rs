//! Remote cursor/selection tracking and local cursor broadcast.

pub mod broadcaster;
pub mod position;

pub use broadcaster::CursorBroadcaster;
pub use position::{CursorPosition, Position, Selection};
