//! Exact marginals by enumerating the joint distribution.
//!
//! Variables are expanded in id order, so the network must be topologically
//! indexed (see [`crate::graph::prepare`]). The frontier after expanding
//! variables `0..k` is a dense vector of `∏ card(0..k)` weights. Joint
//! configurations are encoded with the first variable least significant, so
//! expanding variable `k` maps entry `i` to entries `i + v * stride(k)` and the
//! existing prefix never moves.
//!
//! Evidence is applied while expanding: a branch that picks a value other than
//! the observed one gets weight 0 and stays in the frontier. After the last
//! variable each entry holds `P(configuration, evidence)`.

use super::cpt::{conditional_probability, LookupError};
use crate::evidence::{Evidence, EvidenceError};
use crate::network::Network;
use bn_config::{EngineConfig, LookupPolicy};
use bn_math::{checked_product, normalize_by, stable_sum, MixedRadix, Normalization};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Default cap on the joint state space.
pub const DEFAULT_MAX_JOINT_STATES: u64 = 1 << 24;

/// Knobs for a single [`infer`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceOptions {
    /// Propagate or zero out failed CPT lookups.
    pub lookup_policy: LookupPolicy,
    /// Evidence mass at or below this is treated as impossible.
    pub evidence_epsilon: f64,
    /// Refuse networks whose joint state space is larger than this.
    pub max_joint_states: u64,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            lookup_policy: LookupPolicy::Strict,
            evidence_epsilon: bn_math::DEFAULT_ZERO_MASS,
            max_joint_states: DEFAULT_MAX_JOINT_STATES,
        }
    }
}

impl From<&EngineConfig> for InferenceOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            lookup_policy: config.lookup_policy,
            evidence_epsilon: config.evidence_epsilon,
            max_joint_states: config.max_joint_states,
        }
    }
}

/// Errors raised by [`infer`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Evidence(#[from] EvidenceError),

    #[error("network has no variables")]
    EmptyNetwork,

    #[error("edge {parent} -> {child} goes from a higher id to a lower one")]
    NotTopological { parent: String, child: String },

    #[error("joint state space of {} configurations exceeds the limit of {limit}", describe_states(.states))]
    StateSpaceTooLarge { states: Option<usize>, limit: u64 },

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

fn describe_states(states: &Option<usize>) -> String {
    states.map_or_else(|| "more than usize::MAX".to_string(), |s| s.to_string())
}

impl From<InferenceError> for bn_common::Error {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Evidence(e) => e.into(),
            InferenceError::EmptyNetwork => bn_common::Error::EmptyNetwork,
            e @ InferenceError::NotTopological { .. } => {
                bn_common::Error::NotTopological(e.to_string())
            }
            InferenceError::StateSpaceTooLarge { states, limit } => {
                bn_common::Error::StateSpaceTooLarge {
                    states: describe_states(&states),
                    limit,
                }
            }
            InferenceError::Lookup(e) => e.into(),
        }
    }
}

/// A distribution over one variable's values, in declared order.
///
/// Serializes as a JSON object `{label: probability}` preserving that order.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    labels: Vec<String>,
    probabilities: Vec<f64>,
}

impl Distribution {
    pub fn new(labels: Vec<String>, probabilities: Vec<f64>) -> Self {
        debug_assert_eq!(labels.len(), probabilities.len());
        Self {
            labels,
            probabilities,
        }
    }

    /// Probability of `label`.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.probabilities[i])
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.probabilities.iter().copied())
    }

    /// Total mass (1 for a proper distribution).
    pub fn sum(&self) -> f64 {
        stable_sum(self.probabilities.iter().copied())
    }

    /// Most probable label; ties go to the first declared.
    pub fn mode(&self) -> Option<(&str, f64)> {
        self.iter()
            .fold(None, |best: Option<(&str, f64)>, (label, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((label, p)),
            })
    }
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.labels.len()))?;
        for (label, p) in self.iter() {
            map.serialize_entry(label, &p)?;
        }
        map.end()
    }
}

/// Marginals for every variable plus bookkeeping about the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceResult {
    /// Posterior (or prior, without evidence) for each variable, keyed by name.
    pub marginals: BTreeMap<String, Distribution>,
    /// The evidence the marginals are conditioned on.
    pub evidence: Evidence,
    /// Total mass of the enumerated joint, i.e. `P(evidence)`.
    pub evidence_probability: f64,
    /// What happened when dividing by `evidence_probability`.
    pub normalization: Normalization,
    /// False only when the evidence had (numerically) zero probability.
    pub normalized: bool,
    /// Number of joint configurations enumerated.
    pub joint_states: usize,
    /// CPT lookups that were zeroed under the lenient policy.
    pub lookup_failures: usize,
}

impl InferenceResult {
    /// Marginal of `name`.
    pub fn marginal(&self, name: &str) -> Option<&Distribution> {
        self.marginals.get(name)
    }

    /// True when the evidence was impossible and every marginal is zero.
    pub fn is_degenerate(&self) -> bool {
        !self.normalization.is_defined()
    }
}

/// Compute the marginal of every variable given `evidence`.
///
/// Evidence is checked against the network before any enumeration. The
/// network must be topologically indexed and its joint state space must fit
/// within `options.max_joint_states`.
pub fn infer(
    network: &Network,
    evidence: &Evidence,
    options: &InferenceOptions,
) -> Result<InferenceResult, InferenceError> {
    let observed = evidence.resolve(network)?;

    if network.is_empty() {
        return Err(InferenceError::EmptyNetwork);
    }
    if let Some((parent, child)) = network.edges().find(|(p, c)| p >= c) {
        return Err(InferenceError::NotTopological {
            parent: network.name_of(parent).unwrap_or("?").to_string(),
            child: network.name_of(child).unwrap_or("?").to_string(),
        });
    }

    let cardinalities: Vec<usize> = network.variables().iter().map(|v| v.cardinality()).collect();
    let states = checked_product(cardinalities.iter().copied());
    let layout = match states {
        Some(s) if s as u64 <= options.max_joint_states => MixedRadix::new(cardinalities),
        _ => None,
    }
    .ok_or(InferenceError::StateSpaceTooLarge {
        states,
        limit: options.max_joint_states,
    })?;

    debug!(
        target: "bn_core::inference",
        variables = network.len(),
        joint_states = layout.size(),
        observed = evidence.len(),
        "enumeration started"
    );

    let mut failures = vec![0usize; network.len()];
    let mut frontier = vec![1.0f64];
    let mut digits = Vec::with_capacity(network.len());

    for (k, variable) in network.variables().iter().enumerate() {
        let stride = layout.stride(k);
        let card = layout.radix(k);
        let mut next = vec![0.0f64; stride * card];

        for (index, &weight) in frontier.iter().enumerate() {
            layout.decode_prefix(index, k, &mut digits);
            for value in 0..card {
                let p = match conditional_probability(variable, &digits, value, network) {
                    Ok(p) => p,
                    Err(err) => match options.lookup_policy {
                        LookupPolicy::Strict => return Err(err.into()),
                        LookupPolicy::Lenient => {
                            if failures[k] == 0 {
                                warn!(
                                    target: "bn_core::inference",
                                    variable = %variable.name,
                                    error = %err,
                                    "CPT lookup failed, counting configuration as impossible"
                                );
                            }
                            failures[k] += 1;
                            0.0
                        }
                    },
                };
                let consistent = observed[k].map_or(true, |obs| obs == value);
                next[index + value * stride] = if consistent { weight * p } else { 0.0 };
            }
        }

        frontier = next;
    }

    let total = stable_sum(frontier.iter().copied());

    let mut sums: Vec<Vec<f64>> = network
        .variables()
        .iter()
        .map(|v| vec![0.0; v.cardinality()])
        .collect();
    for (index, &weight) in frontier.iter().enumerate() {
        if weight == 0.0 {
            continue;
        }
        layout.decode_prefix(index, layout.len(), &mut digits);
        for (k, &value) in digits.iter().enumerate() {
            sums[k][value] += weight;
        }
    }

    let mut normalization = Normalization::Skipped { total };
    if !evidence.is_empty() {
        for row in sums.iter_mut() {
            normalization = normalize_by(row, total, options.evidence_epsilon);
        }
        if !normalization.is_defined() {
            warn!(
                target: "bn_core::inference",
                evidence = %evidence,
                total,
                "evidence has zero probability under the model"
            );
        }
    }

    let marginals = network
        .variables()
        .iter()
        .zip(sums)
        .map(|(v, probs)| (v.name.clone(), Distribution::new(v.values.clone(), probs)))
        .collect();

    let lookup_failures = failures.iter().sum();
    debug!(
        target: "bn_core::inference",
        evidence_probability = total,
        lookup_failures,
        "enumeration finished"
    );

    Ok(InferenceResult {
        marginals,
        evidence: evidence.clone(),
        evidence_probability: total,
        normalized: normalization.is_defined(),
        normalization,
        joint_states: layout.size(),
        lookup_failures,
    })
}
