//! Reader for BIF (Bayesian Interchange Format) network descriptions.
//!
//! Variables receive ids in declaration order. Conditional rows written as
//! `(v1, v2) p...;` are placed by their label tuple using the same row layout
//! the CPT resolver reads (last parent varies fastest).

pub mod lexer;
mod parser;

use crate::network::{Network, NetworkError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// The five-variable network used when no file is given.
pub const GRADIENT_BIF: &str = include_str!("../../fixtures/gradient.bif");

/// Errors from reading a BIF description.
#[derive(Debug, Error)]
pub enum BifError {
    #[error("line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("line {line}: {message}")]
    Invalid { line: usize, message: String },

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<BifError> for bn_common::Error {
    fn from(err: BifError) -> Self {
        match err {
            BifError::Network(e) => e.into(),
            BifError::Io { path, source } => bn_common::Error::Io(std::io::Error::new(
                source.kind(),
                format!("{}: {}", path.display(), source),
            )),
            other => bn_common::Error::Parse(other.to_string()),
        }
    }
}

/// Parse a BIF description.
pub fn parse_bif(source: &str) -> Result<Network, BifError> {
    let tokens = lexer::tokenize(source)?;
    let network = parser::Parser::new(tokens).parse_network()?;
    debug!(
        target: "bn_core::bif",
        variables = network.len(),
        edges = network.edges().count(),
        "network parsed"
    );
    Ok(network)
}

/// Read and parse a BIF file.
pub fn load_bif(path: &Path) -> Result<Network, BifError> {
    let source = std::fs::read_to_string(path).map_err(|source| BifError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bif(&source)
}
