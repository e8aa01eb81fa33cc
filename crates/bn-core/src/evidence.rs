//! Observed variable values.
//!
//! Evidence is a name → value mapping. The textual form used on the command
//! line is a comma-separated list of `name=value` pairs:
//!
//! ```
//! use bn_core::Evidence;
//!
//! let ev: Evidence = " a = true , c=false ".parse().unwrap();
//! assert_eq!(ev.get("a"), Some("true"));
//! assert_eq!(ev.len(), 2);
//! ```

use crate::network::Network;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing evidence or matching it against a network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvidenceError {
    #[error("expected name=value, got '{0}'")]
    MalformedPair(String),

    #[error("empty variable name in '{0}'")]
    EmptyName(String),

    #[error("empty value for variable '{0}'")]
    EmptyValue(String),

    #[error("variable '{variable}' is given both '{first}' and '{second}'")]
    Conflicting {
        variable: String,
        first: String,
        second: String,
    },

    #[error("evidence names unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("value '{value}' is not declared for '{variable}' (allowed: {})", .allowed.join(", "))]
    UnknownValue {
        variable: String,
        value: String,
        allowed: Vec<String>,
    },
}

impl From<EvidenceError> for bn_common::Error {
    fn from(err: EvidenceError) -> Self {
        match err {
            EvidenceError::UnknownVariable(variable) => {
                bn_common::Error::UnknownEvidenceVariable { variable }
            }
            EvidenceError::UnknownValue {
                variable, value, ..
            } => bn_common::Error::UnknownEvidenceValue { variable, value },
            other => bn_common::Error::MalformedEvidence(other.to_string()),
        }
    }
}

/// Observed values keyed by variable name, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Evidence(BTreeMap<String, String>);

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `"a=true, c=false"`. Blank input and empty segments are ignored.
    pub fn parse(input: &str) -> Result<Self, EvidenceError> {
        let mut evidence = Evidence::new();
        for segment in input.split(',') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (name, value) = segment
                .split_once('=')
                .ok_or_else(|| EvidenceError::MalformedPair(segment.to_string()))?;
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() {
                return Err(EvidenceError::EmptyName(segment.to_string()));
            }
            if value.is_empty() {
                return Err(EvidenceError::EmptyValue(name.to_string()));
            }
            evidence.insert(name, value)?;
        }
        Ok(evidence)
    }

    /// Record an observation. Repeating the same value is allowed.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), EvidenceError> {
        let name = name.into();
        let value = value.into();
        match self.0.get(&name) {
            Some(existing) if *existing != value => Err(EvidenceError::Conflicting {
                variable: name,
                first: existing.clone(),
                second: value,
            }),
            Some(_) => Ok(()),
            None => {
                self.0.insert(name, value);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Observed value index for each variable id of `network` (`None` = unobserved).
    ///
    /// Every name and value must exist in the network.
    pub fn resolve(&self, network: &Network) -> Result<Vec<Option<usize>>, EvidenceError> {
        let mut observed = vec![None; network.len()];
        for (name, value) in self.iter() {
            let variable = network
                .variable_by_name(name)
                .ok_or_else(|| EvidenceError::UnknownVariable(name.to_string()))?;
            let index = variable
                .value_index(value)
                .ok_or_else(|| EvidenceError::UnknownValue {
                    variable: name.to_string(),
                    value: value.to_string(),
                    allowed: variable.values.clone(),
                })?;
            observed[variable.id.index()] = Some(index);
        }
        Ok(observed)
    }
}

impl FromStr for Evidence {
    type Err = EvidenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Evidence::parse(s)
    }
}

impl std::fmt::Display for Evidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (name, value) in self.iter() {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{name}={value}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bif::{parse_bif, GRADIENT_BIF};

    #[test]
    fn parse_trims_and_skips_blanks() {
        let ev = Evidence::parse("  a=true ,, c = false ,").unwrap();
        assert_eq!(ev.get("a"), Some("true"));
        assert_eq!(ev.get("c"), Some("false"));
        assert_eq!(ev.len(), 2);
        assert!(Evidence::parse("").unwrap().is_empty());
        assert!(Evidence::parse("   ").unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_malformed_pairs() {
        assert_eq!(
            Evidence::parse("a"),
            Err(EvidenceError::MalformedPair("a".into()))
        );
        assert_eq!(
            Evidence::parse("=true"),
            Err(EvidenceError::EmptyName("=true".into()))
        );
        assert_eq!(
            Evidence::parse("a= "),
            Err(EvidenceError::EmptyValue("a".into()))
        );
    }

    #[test]
    fn conflicting_values_are_rejected_but_repeats_are_fine() {
        assert!(Evidence::parse("a=true,a=true").is_ok());
        assert!(matches!(
            Evidence::parse("a=true,a=false"),
            Err(EvidenceError::Conflicting { .. })
        ));
    }

    #[test]
    fn display_round_trips() {
        let ev: Evidence = "c=false,a=true".parse().unwrap();
        assert_eq!(ev.to_string(), "a=true,c=false");
        assert_eq!(ev.to_string().parse::<Evidence>().unwrap(), ev);
    }

    #[test]
    fn resolve_maps_to_value_indices() {
        let net = parse_bif(GRADIENT_BIF).unwrap();
        let ev: Evidence = "a=true,d=false".parse().unwrap();
        let observed = ev.resolve(&net).unwrap();
        assert_eq!(observed[net.id_of("a").unwrap().index()], Some(0));
        assert_eq!(observed[net.id_of("d").unwrap().index()], Some(1));
        assert_eq!(observed[net.id_of("b").unwrap().index()], None);
    }

    #[test]
    fn resolve_rejects_unknown_names_and_values() {
        let net = parse_bif(GRADIENT_BIF).unwrap();
        let err = Evidence::parse("rain=true").unwrap().resolve(&net).unwrap_err();
        assert_eq!(err, EvidenceError::UnknownVariable("rain".into()));
        let common: bn_common::Error = err.into();
        assert_eq!(common.code(), 40);

        let err = Evidence::parse("a=maybe").unwrap().resolve(&net).unwrap_err();
        assert!(err.to_string().contains("allowed: true, false"));
        let common: bn_common::Error = err.into();
        assert_eq!(common.code(), 41);
    }

    #[test]
    fn serializes_as_plain_object() {
        let ev: Evidence = "a=true".parse().unwrap();
        assert_eq!(serde_json::to_string(&ev).unwrap(), r#"{"a":"true"}"#);
    }
}
