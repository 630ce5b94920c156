//! Workspace presence: who is here, and what they are doing.

pub mod activity;
pub mod status;
pub mod tracker;
pub mod user;

pub use activity::ActivityEvent;
pub use status::PresenceStatus;
pub use tracker::PresenceTracker;
pub use user::User;
