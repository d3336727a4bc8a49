//! Errors raised while building a chain registry from modules.

use thiserror::Error;

use strand_core::error::{BoxError, DistributionError, MetaDataError, RoutingError};
use strand_core::pipeline::ChainName;

/// The build phase a module error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    /// The `init` phase: publishing metadata and distributors.
    Init,
    /// The `configure` phase: providing and looking up shared dependencies.
    Configure,
    /// The `register` phase: creating and extending chains.
    Register,
}

impl std::fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init => f.write_str("init"),
            Self::Configure => f.write_str("configure"),
            Self::Register => f.write_str("register"),
        }
    }
}

/// Errors from [`ChainRegistryBuilder::build`](crate::ChainRegistryBuilder::build).
///
/// All of these indicate a module-composition bug and surface before any
/// request can be served.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Two modules tried to create a chain with the same name.
    #[error(
        "module '{module}' tried to create chain '{name}', which module \
         '{existing_owner}' already created"
    )]
    DuplicateChain {
        /// The contested chain name.
        name: ChainName,
        /// The module that created the chain first.
        existing_owner: &'static str,
        /// The module whose creation attempt failed.
        module: &'static str,
    },

    /// A module tried to extend a chain that no module created.
    #[error("module '{module}' tried to extend unknown chain '{name}'")]
    UnknownChain {
        /// The missing chain name.
        name: ChainName,
        /// The module that referenced it.
        module: &'static str,
    },

    /// A chain's terminal action or jump rule targets a chain that was never
    /// created.
    #[error("chain '{chain}' jumps to '{target}', which no module created")]
    DanglingJumpTarget {
        /// The chain holding the dangling reference.
        chain: ChainName,
        /// The nonexistent target.
        target: ChainName,
    },

    /// A module's configuration section failed to deserialize.
    #[error("configuration for module '{module}' is invalid: {source}")]
    InvalidConfig {
        /// The module whose configuration was rejected.
        module: &'static str,
        /// The deserialization error.
        source: serde_json::Error,
    },

    /// Registering a routing condition failed.
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// Distributing a handler during the build failed.
    #[error(transparent)]
    Distribution(#[from] DistributionError),

    /// A build-time metadata access failed.
    #[error(transparent)]
    MetaData(#[from] MetaDataError),

    /// A module reported an error of its own.
    #[error("module '{module}' failed during {phase}: {source}")]
    Module {
        /// The failing module.
        module: &'static str,
        /// The phase it failed in.
        phase: BuildPhase,
        /// The module's error.
        source: BoxError,
    },
}
