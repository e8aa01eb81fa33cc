//! Engine configuration loading for bn-core.
//!
//! Paths are discovered by [`bn_config::resolve_config`]; this module reads
//! the chosen file, validates it and records where it came from.

pub use bn_config::{
    validate_engine, ConfigPaths, ConfigSource, CyclePolicy, EngineConfig, LookupPolicy,
    ValidationError,
};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("{}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error("Semantic validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl From<ConfigError> for bn_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { .. } => bn_common::Error::Config(err.to_string()),
            ConfigError::Invalid { .. } | ConfigError::Validation(_) => {
                bn_common::Error::InvalidConfig(err.to_string())
            }
        }
    }
}

/// Engine configuration with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub engine: EngineConfig,
    /// File the configuration was read from (None when using defaults).
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

impl ResolvedConfig {
    /// Built-in defaults, no file involved.
    pub fn builtin() -> Self {
        Self {
            engine: EngineConfig::default(),
            path: None,
            source: ConfigSource::BuiltinDefault,
        }
    }
}

/// Load the engine configuration.
///
/// Resolution order (highest to lowest priority):
/// 1. Explicit `--config` path (must exist)
/// 2. `BN_ENGINE_CONFIG`, then `BN_CONFIG_DIR/engine.json`
/// 3. XDG config home (~/.config/bayesnet/engine.json)
/// 4. /etc/bayesnet/engine.json
/// 5. Built-in defaults
pub fn load_config(cli_path: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
    load_from_paths(bn_config::resolve_config(cli_path))
}

/// Load from already-resolved paths.
pub fn load_from_paths(paths: ConfigPaths) -> Result<ResolvedConfig, ConfigError> {
    let Some(path) = paths.engine else {
        let resolved = ResolvedConfig::builtin();
        validate_engine(&resolved.engine)?;
        return Ok(resolved);
    };

    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }

    let engine = EngineConfig::from_file(&path).map_err(|source| ConfigError::Invalid {
        path: path.clone(),
        source,
    })?;
    validate_engine(&engine).map_err(|source| ConfigError::Invalid {
        path: path.clone(),
        source,
    })?;

    Ok(ResolvedConfig {
        engine,
        path: Some(path),
        source: paths.engine_source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    fn cli(path: &Path) -> ConfigPaths {
        ConfigPaths {
            engine: Some(path.to_path_buf()),
            engine_source: ConfigSource::CliArgument,
        }
    }

    #[test]
    fn no_file_means_builtin_defaults() {
        let resolved = load_from_paths(ConfigPaths::default()).unwrap();
        assert_eq!(resolved.engine, EngineConfig::default());
        assert_eq!(resolved.source, ConfigSource::BuiltinDefault);
        assert!(resolved.path.is_none());
    }

    #[test]
    fn explicit_file_is_loaded() {
        let file = write_config(r#"{"lookup_policy": "lenient", "max_joint_states": 64}"#);
        let resolved = load_config(Some(file.path())).unwrap();
        assert_eq!(resolved.engine.lookup_policy, LookupPolicy::Lenient);
        assert_eq!(resolved.engine.max_joint_states, 64);
        assert_eq!(resolved.engine.cycle_policy, CyclePolicy::Reject);
        assert_eq!(resolved.source, ConfigSource::CliArgument);
        assert_eq!(resolved.path.as_deref(), Some(file.path()));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/no/such/engine.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
        let common: bn_common::Error = err.into();
        assert_eq!(common.code(), 60);
    }

    #[test]
    fn malformed_json_names_the_file() {
        let file = write_config("{ not json");
        let err = load_from_paths(cli(file.path())).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
        assert!(matches!(
            err,
            ConfigError::Invalid {
                source: ValidationError::ParseError(_),
                ..
            }
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let file = write_config(r#"{"max_states": 10}"#);
        assert!(load_from_paths(cli(file.path())).is_err());
    }

    #[test]
    fn semantic_errors_map_to_invalid_config() {
        let file = write_config(r#"{"sum_tolerance": 0.0}"#);
        let err = load_from_paths(cli(file.path())).unwrap_err();
        assert!(err.to_string().contains("sum_tolerance"));
        let common: bn_common::Error = err.into();
        assert_eq!(common.code(), 61);
    }

    #[test]
    fn schema_version_is_checked() {
        let file = write_config(r#"{"schema_version": "9.0.0"}"#);
        let err = load_from_paths(cli(file.path())).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                source: ValidationError::VersionMismatch { .. },
                ..
            }
        ));
    }
}
