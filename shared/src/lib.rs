//! Platebook Shared Library
//!
//! This crate contains the wire types and validation rules shared across
//! the backend and any future clients.

pub mod types;
pub mod validation;

// Re-export commonly used items
pub use types::*;
