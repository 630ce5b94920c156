//! # taskhub-core
//!
//! Core crate for TaskHub. Contains configuration schemas, typed
//! identifiers, and the unified error system shared by the collaboration
//! layer and the host binary.
//!
//! This crate has **no** internal dependencies on other TaskHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
