//! Common types and utilities shared by the package writers.
//!
//! This module provides the unified error type and the XML helpers used to
//! render package documents.

// Submodule declarations
pub mod error;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
