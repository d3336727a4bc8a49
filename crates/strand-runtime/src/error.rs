//! Runtime error types.

use thiserror::Error;

use strand_framework::BuildError;

/// Errors from loading the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration source failed to load or extract.
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),
}

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from starting the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The module build failed.
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Result alias for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
