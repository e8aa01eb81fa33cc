//! Configuration validation errors and semantic validation.

use crate::engine::EngineConfig;
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 62,
            ValidationError::VersionMismatch { .. } => 63,
        }
    }
}

/// Validate engine configuration semantically.
pub fn validate_engine(config: &EngineConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    validate_non_negative("evidence_epsilon", config.evidence_epsilon)?;
    validate_positive("sum_tolerance", config.sum_tolerance)?;
    validate_positive("cpt_row_tolerance", config.cpt_row_tolerance)?;

    if config.evidence_epsilon >= 1.0 {
        return Err(ValidationError::InvalidValue {
            field: "evidence_epsilon".to_string(),
            message: format!("Must be below 1, got {}", config.evidence_epsilon),
        });
    }

    if config.max_joint_states == 0 {
        return Err(ValidationError::InvalidValue {
            field: "max_joint_states".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }

    Ok(())
}

fn validate_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be finite and >= 0, got {}", value),
        });
    }
    Ok(())
}

fn validate_positive(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be finite and > 0, got {}", value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_engine(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_version_mismatch() {
        let config = EngineConfig {
            schema_version: "0.9.0".to_string(),
            ..Default::default()
        };
        let err = validate_engine(&config).unwrap_err();
        assert!(matches!(err, ValidationError::VersionMismatch { .. }));
        assert_eq!(err.code(), 63);
    }

    #[test]
    fn test_negative_epsilon_rejected() {
        let config = EngineConfig {
            evidence_epsilon: -1e-12,
            ..Default::default()
        };
        assert!(matches!(
            validate_engine(&config),
            Err(ValidationError::InvalidValue { ref field, .. }) if field == "evidence_epsilon"
        ));
    }

    #[test]
    fn test_zero_tolerance_rejected() {
        let config = EngineConfig {
            sum_tolerance: 0.0,
            ..Default::default()
        };
        assert!(validate_engine(&config).is_err());
    }

    #[test]
    fn test_nan_rejected() {
        let config = EngineConfig {
            cpt_row_tolerance: f64::NAN,
            ..Default::default()
        };
        assert!(validate_engine(&config).is_err());
    }

    #[test]
    fn test_zero_state_limit_rejected() {
        let config = EngineConfig {
            max_joint_states: 0,
            ..Default::default()
        };
        assert!(validate_engine(&config).is_err());
    }
}
