//! Configuration loading using figment.
//!
//! Configuration is layered; later sources override earlier ones:
//!
//! 1. Built-in defaults
//! 2. The config file (`strand.toml` by default; missing files are fine)
//! 3. Environment variables (`STRAND_*`)
//!
//! Environment variables use the `STRAND_` prefix with `__` as the section
//! separator:
//!
//! - `STRAND_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `STRAND_MODULES__CORS__MAX_AGE=600` → `modules.cors.max_age = 600`
//!
//! # Example
//!
//! ```rust,no_run
//! use strand_runtime::config::StrandConfig;
//!
//! let config = StrandConfig::load()?;
//! println!("log level: {}", config.logging.level);
//! # Ok::<(), strand_runtime::error::ConfigError>(())
//! ```

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tracing::debug;

use std::collections::HashMap;
use std::path::Path;

use crate::error::ConfigResult;

/// The default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "strand.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StrandConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-module configuration sections, keyed by module name. Each section
    /// is handed verbatim to the module of that name during the build.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

impl StrandConfig {
    /// Loads configuration from the default file location and environment.
    pub fn load() -> ConfigResult<Self> {
        Self::from_file(DEFAULT_CONFIG_FILE)
    }

    /// Loads configuration with `path` as the config file.
    ///
    /// A missing file is not an error; defaults and environment variables
    /// still apply.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("STRAND_").split("__"))
            .extract()?;
        debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Per-target level overrides, e.g. `strand_core = "trace"`.
    #[serde(default)]
    pub filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            filters: HashMap::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact single-line output.
    #[default]
    Compact,
    /// The default `tracing-subscriber` format.
    Full,
    /// Multi-line human-oriented output.
    Pretty,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
}
