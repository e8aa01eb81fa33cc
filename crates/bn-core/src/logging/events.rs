//! Structured event definitions for logging.
//!
//! Every event carries its name, the run id and the pipeline stage it
//! belongs to.

use serde::{Deserialize, Serialize};

/// Stages of a bn-core run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Reading the network description.
    Parse,
    /// Topological sort.
    Sort,
    /// Renumbering variables into topological order.
    Reindex,
    /// Enumeration and normalisation.
    Infer,
    /// Writing the result.
    Render,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Parse => "parse",
            Stage::Sort => "sort",
            Stage::Reindex => "reindex",
            Stage::Infer => "infer",
            Stage::Render => "render",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Parse stage
    pub const PARSE_STARTED: &str = "parse.started";
    pub const PARSE_FINISHED: &str = "parse.finished";

    // Sort/reindex stage
    pub const SORT_FINISHED: &str = "sort.finished";
    pub const SORT_CYCLE: &str = "sort.cycle";
    pub const REINDEX_FINISHED: &str = "reindex.finished";

    // Infer stage
    pub const INFER_STARTED: &str = "infer.started";
    pub const INFER_ZERO_EVIDENCE: &str = "infer.zero_evidence";
    pub const INFER_FINISHED: &str = "infer.finished";

    // Config/init events
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    // Error events
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Run-scoped identifiers shared by every event of one invocation.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    pub network: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            network: None,
        }
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Network name or `"-"` for logging.
    pub fn network_label(&self) -> &str {
        self.network.as_deref().unwrap_or("-")
    }
}
