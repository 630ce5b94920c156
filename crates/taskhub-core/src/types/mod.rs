//! Core type definitions used across the TaskHub workspace.

pub mod id;

pub use id::*;
