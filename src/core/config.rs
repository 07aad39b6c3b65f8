//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.scriptpad/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ScriptpadConfig {
    #[serde(default)]
    pub runner: RunnerConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RunnerConfig {
    pub interpreter: Option<String>,
    pub interpreter_args: Option<Vec<String>>,
    pub script_file: Option<String>,
    pub read_chunk_size: Option<usize>,
    pub run_timeout_secs: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_INTERPRETER: &str = "kotlinc";
pub const DEFAULT_INTERPRETER_ARGS: &[&str] = &["-script"];
pub const DEFAULT_SCRIPT_FILE: &str = "scratch.kts";
pub const DEFAULT_READ_CHUNK_SIZE: usize = 100;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub interpreter: String,
    pub interpreter_args: Vec<String>,
    /// Path handed to the interpreter. Diagnostics are matched against it
    /// verbatim, so it is kept exactly as configured.
    pub script_file: PathBuf,
    pub read_chunk_size: usize,
    pub run_timeout_secs: Option<u64>,
}

/// Built-in defaults only; ignores the environment.
impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve_with_env(&ScriptpadConfig::default(), &CliOverrides::default(), |_| None)
    }
}

/// Values given on the command line. `None` = flag not given.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub interpreter: Option<String>,
    pub script_file: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.scriptpad/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".scriptpad").join("config.toml"))
}

/// Load config from `~/.scriptpad/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ScriptpadConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ScriptpadConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ScriptpadConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(ScriptpadConfig::default());
    }

    load_config_from(&path)
}

/// Load and parse a config file at an explicit path.
pub fn load_config_from(path: &Path) -> Result<ScriptpadConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ScriptpadConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# scriptpad configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [runner]
# interpreter = "kotlinc"              # Or set SCRIPTPAD_INTERPRETER
# interpreter_args = ["-script"]       # Script path is appended after these
# script_file = "scratch.kts"          # Or set SCRIPTPAD_SCRIPT_FILE
# read_chunk_size = 100                # Bytes per output read
# run_timeout_secs = 60                # Unset = no timeout
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &ScriptpadConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// `resolve` with an injectable environment lookup.
fn resolve_with_env(
    config: &ScriptpadConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let runner = &config.runner;

    // Interpreter: CLI → env → config → default
    let interpreter = cli
        .interpreter
        .clone()
        .or_else(|| env("SCRIPTPAD_INTERPRETER"))
        .or_else(|| runner.interpreter.clone())
        .unwrap_or_else(|| DEFAULT_INTERPRETER.to_string());

    // Script file: CLI → env → config → default
    let script_file = cli
        .script_file
        .clone()
        .or_else(|| env("SCRIPTPAD_SCRIPT_FILE"))
        .or_else(|| runner.script_file.clone())
        .unwrap_or_else(|| DEFAULT_SCRIPT_FILE.to_string());

    let interpreter_args = runner.interpreter_args.clone().unwrap_or_else(|| {
        DEFAULT_INTERPRETER_ARGS
            .iter()
            .map(|s| s.to_string())
            .collect()
    });

    let read_chunk_size = match runner.read_chunk_size {
        Some(0) => {
            warn!("read_chunk_size must be at least 1, using 1");
            1
        }
        Some(n) => n,
        None => DEFAULT_READ_CHUNK_SIZE,
    };

    ResolvedConfig {
        interpreter,
        interpreter_args,
        script_file: PathBuf::from(script_file),
        read_chunk_size,
        run_timeout_secs: runner.run_timeout_secs.filter(|&secs| secs > 0),
    }
}
