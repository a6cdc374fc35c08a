//! Configuration loading
//!
//! Every setting is resolved in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing default config file is not an error: a warning is logged and the
//! remaining sources are used. A config file named explicitly must exist.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable overriding the dataset path
pub const ENV_DATASET: &str = "CONVO_DATASET";

/// Environment variable overriding the audio asset base (URL or directory)
pub const ENV_AUDIO_BASE: &str = "CONVO_AUDIO_BASE";

/// Environment variable overriding the state database path
pub const ENV_DATABASE: &str = "CONVO_DATABASE";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Path to the dataset JSON document
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,

    /// Base URL or directory the line file names are resolved against
    #[serde(default)]
    pub audio_base: Option<String>,

    /// SQLite file holding viewed-conversation state
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Directory exported audio is written to
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Per-resource fetch timeout during export
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Event bus channel capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_fetch_timeout_ms() -> u64 {
    30_000
}

fn default_event_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            audio_base: None,
            database_path: None,
            output_dir: None,
            fetch_timeout_ms: default_fetch_timeout_ms(),
            event_capacity: default_event_capacity(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load the explicit config file, or the platform default one if present.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                debug!("Using config file {}", path.display());
                Self::load(&path)
            }
            Some(path) => {
                warn!(
                    "No config file at {}, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                warn!("Could not determine config directory, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Platform config file location: `<config_dir>/convo/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("convo").join("config.toml"))
}

/// Built-in fallbacks used when no other source provides a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub dataset_path: PathBuf,
    pub audio_base: String,
    pub database_path: PathBuf,
    pub output_dir: PathBuf,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let data_dir = dirs::data_local_dir()
            .map(|d| d.join("convo"))
            .unwrap_or_else(|| PathBuf::from("./convo_data"));

        Self {
            dataset_path: PathBuf::from("public/Sample.json"),
            audio_base: "public/audioFiles".to_string(),
            database_path: data_dir.join("convo.db"),
            output_dir: PathBuf::from("."),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dataset_path: Option<PathBuf>,
    pub audio_base: Option<String>,
    pub database_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub dataset_path: PathBuf,
    pub audio_base: String,
    pub database_path: PathBuf,
    pub output_dir: PathBuf,
    pub fetch_timeout: Duration,
    pub event_capacity: usize,
    pub log_level: String,
}

impl Settings {
    /// Resolve every setting from CLI, environment, TOML and compiled defaults
    pub fn resolve(cli: &CliOverrides, toml: &TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        let dataset_path = cli
            .dataset_path
            .clone()
            .or_else(|| env_path(ENV_DATASET))
            .or_else(|| toml.dataset_path.clone())
            .unwrap_or(defaults.dataset_path);

        let audio_base = cli
            .audio_base
            .clone()
            .or_else(|| env_value(ENV_AUDIO_BASE))
            .or_else(|| toml.audio_base.clone())
            .unwrap_or(defaults.audio_base);

        let database_path = cli
            .database_path
            .clone()
            .or_else(|| env_path(ENV_DATABASE))
            .or_else(|| toml.database_path.clone())
            .unwrap_or(defaults.database_path);

        let output_dir = cli
            .output_dir
            .clone()
            .or_else(|| toml.output_dir.clone())
            .unwrap_or(defaults.output_dir);

        Self {
            dataset_path,
            audio_base,
            database_path,
            output_dir,
            fetch_timeout: Duration::from_millis(toml.fetch_timeout_ms),
            event_capacity: toml.event_capacity.max(1),
            log_level: toml.logging.level.clone(),
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_path(name: &str) -> Option<PathBuf> {
    env_value(name).map(PathBuf::from)
}
