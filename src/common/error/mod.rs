//! Unified error types for odpack.
//!
//! This module provides a single error type for the package writers and the
//! encryption layer, presenting a consistent API to users.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
