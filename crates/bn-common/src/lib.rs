//! Shared types for the Bayesian network inference workspace.
//!
//! This crate provides foundational types used by every other crate:
//! - Variable identity types
//! - The unified error type with stable codes
//! - Output format specifications

pub mod error;
pub mod id;
pub mod output;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError};
pub use id::VariableId;
pub use output::OutputFormat;

/// Schema version stamped on every machine-readable payload.
pub const SCHEMA_VERSION: &str = "1.0.0";
