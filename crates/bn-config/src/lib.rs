//! Engine configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for engine.json
//! - Config resolution (CLI → env → XDG → /etc → defaults)
//! - Semantic validation

pub mod engine;
pub mod resolve;
pub mod validate;

pub use engine::{CyclePolicy, EngineConfig, LookupPolicy};
pub use resolve::{resolve_config, ConfigPaths, ConfigSource};
pub use validate::{validate_engine, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
