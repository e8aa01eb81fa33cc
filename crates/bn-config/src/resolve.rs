//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths → /etc → defaults.

use std::path::{Path, PathBuf};

/// Discovered configuration file paths.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to engine.json (or None if not found).
    pub engine: Option<PathBuf>,

    /// Source of the engine config (for diagnostics).
    pub engine_source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/bayesnet/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_ENGINE_PATH: &str = "BN_ENGINE_CONFIG";
pub const ENV_CONFIG_DIR: &str = "BN_CONFIG_DIR";

/// Standard config file name.
pub const ENGINE_FILENAME: &str = "engine.json";

/// Application name for XDG directories.
const APP_NAME: &str = "bayesnet";

/// Resolve configuration paths using the standard resolution order.
///
/// 1. Explicit CLI path (returned even if missing, so the loader can report it)
/// 2. `BN_ENGINE_CONFIG` (direct path)
/// 3. `BN_CONFIG_DIR` + engine.json
/// 4. XDG config directory (~/.config/bayesnet/)
/// 5. System config (/etc/bayesnet/)
/// 6. Built-in defaults (None)
pub fn resolve_config(cli_engine: Option<&Path>) -> ConfigPaths {
    let mut paths = ConfigPaths::default();
    paths.engine = resolve_single_config(
        cli_engine,
        ENV_ENGINE_PATH,
        ENGINE_FILENAME,
        &mut paths.engine_source,
    );
    paths
}

fn resolve_single_config(
    cli_path: Option<&Path>,
    env_var: &str,
    filename: &str,
    source: &mut ConfigSource,
) -> Option<PathBuf> {
    // 1. CLI argument
    if let Some(path) = cli_path {
        *source = ConfigSource::CliArgument;
        return Some(path.to_path_buf());
    }

    // 2. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(env_var) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            *source = ConfigSource::Environment;
            return Some(path);
        }
    }

    // 3. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(filename);
        if path.exists() {
            *source = ConfigSource::Environment;
            return Some(path);
        }
    }

    // 4. XDG config directory
    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(filename);
        if path.exists() {
            *source = ConfigSource::XdgConfig;
            return Some(path);
        }
    }

    // 5. System config
    let system_path = system_config_dir().join(filename);
    if system_path.exists() {
        *source = ConfigSource::SystemConfig;
        return Some(system_path);
    }

    *source = ConfigSource::BuiltinDefault;
    None
}

/// Get the XDG config directory for bayesnet.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}
