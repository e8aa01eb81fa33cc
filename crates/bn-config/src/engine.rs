//! Engine configuration types.
//!
//! Every field has a default, so an empty `{}` file (or no file at all) yields
//! the strict, fail-fast behaviour.

use serde::{Deserialize, Serialize};

/// What the topological sorter does when it finds a back edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Abort with a structural error.
    #[default]
    Reject,
    /// Log the offending edge and keep sorting. The resulting order is not
    /// guaranteed to be topological.
    Warn,
}

impl std::fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CyclePolicy::Reject => write!(f, "reject"),
            CyclePolicy::Warn => write!(f, "warn"),
        }
    }
}

impl std::str::FromStr for CyclePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" | "error" | "strict" => Ok(CyclePolicy::Reject),
            "warn" | "continue" => Ok(CyclePolicy::Warn),
            _ => Err(format!("unknown cycle policy: {}", s)),
        }
    }
}

/// What the enumeration engine does with an out-of-range CPT lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPolicy {
    /// Propagate the lookup error and stop.
    #[default]
    Strict,
    /// Log the error and count the configuration as probability zero.
    Lenient,
}

impl std::fmt::Display for LookupPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupPolicy::Strict => write!(f, "strict"),
            LookupPolicy::Lenient => write!(f, "lenient"),
        }
    }
}

impl std::str::FromStr for LookupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" | "error" => Ok(LookupPolicy::Strict),
            "lenient" | "zero" => Ok(LookupPolicy::Lenient),
            _ => Err(format!("unknown lookup policy: {}", s)),
        }
    }
}

/// Complete engine configuration (engine.json).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub schema_version: String,

    /// Behaviour on cycles found while sorting.
    pub cycle_policy: CyclePolicy,

    /// Behaviour on CPT lookups outside the table.
    pub lookup_policy: LookupPolicy,

    /// Evidence mass at or below this is treated as impossible evidence.
    pub evidence_epsilon: f64,

    /// Allowed deviation from 1.0 when reporting a marginal's sum.
    pub sum_tolerance: f64,

    /// Allowed deviation from 1.0 for a CPT row during network checks.
    pub cpt_row_tolerance: f64,

    /// Upper bound on the joint state space the engine will enumerate.
    pub max_joint_states: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            cycle_policy: CyclePolicy::default(),
            lookup_policy: LookupPolicy::default(),
            evidence_epsilon: 1e-12,
            sum_tolerance: 1e-9,
            cpt_row_tolerance: 1e-6,
            max_joint_states: 1 << 24,
        }
    }
}

impl EngineConfig {
    /// Load engine configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, crate::validate::ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::validate::ValidationError::IoError(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&content)
    }

    /// Parse engine configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, crate::validate::ValidationError> {
        serde_json::from_str(json).map_err(|e| {
            crate::validate::ValidationError::ParseError(format!("Invalid JSON: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_strict() {
        let config = EngineConfig::default();
        assert_eq!(config.cycle_policy, CyclePolicy::Reject);
        assert_eq!(config.lookup_policy, LookupPolicy::Strict);
        assert_eq!(config.evidence_epsilon, 1e-12);
        assert_eq!(config.max_joint_states, 16_777_216);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config =
            EngineConfig::from_json(r#"{"cycle_policy": "warn", "max_joint_states": 64}"#).unwrap();
        assert_eq!(config.cycle_policy, CyclePolicy::Warn);
        assert_eq!(config.max_joint_states, 64);
        assert_eq!(config.lookup_policy, LookupPolicy::Strict);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(EngineConfig::from_json(r#"{"cycle_polcy": "warn"}"#).is_err());
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("warn".parse::<CyclePolicy>().unwrap(), CyclePolicy::Warn);
        assert_eq!("ERROR".parse::<CyclePolicy>().unwrap(), CyclePolicy::Reject);
        assert_eq!("zero".parse::<LookupPolicy>().unwrap(), LookupPolicy::Lenient);
        assert!("sometimes".parse::<LookupPolicy>().is_err());
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(CyclePolicy::Reject.to_string(), "reject");
        assert_eq!(LookupPolicy::Lenient.to_string(), "lenient");
    }
}
