//! Bayesian Network Core Library
//!
//! Exact inference on discrete Bayesian networks by full joint enumeration:
//! - Network model and builder
//! - BIF reader for network descriptions
//! - Topological sorting and reindexing
//! - CPT lookup and the enumeration engine
//! - Engine configuration, logging, exit codes and result rendering
//!
//! The binary entry point is in `main.rs`.
//!
//! ```
//! use bn_core::{bif, evidence::Evidence, graph, inference};
//! use bn_config::CyclePolicy;
//!
//! let network = bif::parse_bif(bif::GRADIENT_BIF).unwrap();
//! let sorted = graph::prepare(&network, CyclePolicy::Reject).unwrap();
//! let evidence: Evidence = "a=true".parse().unwrap();
//! let result = inference::infer(&sorted, &evidence, &Default::default()).unwrap();
//! let b = result.marginal("b").unwrap();
//! assert!((b.get("true").unwrap() - 0.8).abs() < 1e-12);
//! ```

pub mod bif;
pub mod config;
pub mod evidence;
pub mod exit_codes;
pub mod graph;
pub mod inference;
pub mod logging;
pub mod network;
pub mod output;

pub use evidence::{Evidence, EvidenceError};
pub use network::{Network, NetworkBuilder, NetworkError, Variable};
