//! Unified error types for the Strand core engine.
//!
//! Each concern gets its own error enum; build-protocol errors live in the
//! `strand-framework` crate. The taxonomy separates:
//!
//! - **programming-error-class failures** ([`MetaDataError`],
//!   [`ExecutionError`]) — module bugs, surfaced to the caller directly;
//! - **per-request processor failures** ([`PipelineError`]) — always caught
//!   at the chain boundary and redirected into the owning chain's exception
//!   path, never allowed to escape a pipeline run;
//! - **build-time configuration errors** ([`RoutingError`],
//!   [`DistributionError`], [`FilterMapError`]) — fail fast before any
//!   request can be served.

use thiserror::Error;

use crate::pipeline::ChainName;

/// Type-erased error returned by processors, transforms, and modules.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from [`MetaData`](crate::foundation::MetaData) slot access.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetaDataError {
    /// The slot was never set.
    #[error("metadata key '{key}' is not set")]
    KeyNotFound {
        /// Name of the missing key.
        key: &'static str,
    },

    /// The slot holds a value of a different type than the key promises.
    #[error("metadata key '{key}' does not hold a value of type {expected}")]
    TypeMismatch {
        /// Name of the key.
        key: &'static str,
        /// The type the caller asked for.
        expected: &'static str,
    },
}

/// A caught per-request processor failure.
///
/// Stored in the [`EXCEPTION`](crate::pipeline::EXCEPTION) slot of the
/// context it occurred in, where exception-chain processors and the terminal
/// consumer can inspect it.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A processor returned an error.
    #[error("processor {index} in chain '{chain}' failed: {source}")]
    Processor {
        /// Chain the processor belongs to.
        chain: ChainName,
        /// Position of the processor within the chain.
        index: usize,
        /// The error the processor returned.
        source: BoxError,
    },

    /// A processor panicked; the panic was caught at the chain boundary.
    #[error("processor {index} in chain '{chain}' panicked: {message}")]
    Panic {
        /// Chain the processor belongs to.
        chain: ChainName,
        /// Position of the processor within the chain.
        index: usize,
        /// The panic payload, when it was a string.
        message: String,
    },
}

impl PipelineError {
    /// The chain in which the failure occurred.
    pub fn chain(&self) -> ChainName {
        match self {
            Self::Processor { chain, .. } | Self::Panic { chain, .. } => *chain,
        }
    }
}

/// Errors from driving a context through the registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecutionError {
    /// The requested start chain does not exist.
    ///
    /// Jump targets inside the registry cannot dangle — the build validates
    /// them — so this can only happen for a caller-supplied start name.
    #[error("chain '{0}' does not exist in this registry")]
    UnknownChain(ChainName),
}

/// Errors from registering routing conditions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoutingError {
    /// Two registered conditions can match the same context.
    #[error(
        "condition '{added}' overlaps with the already registered condition \
         '{existing}' and would therefore never trigger"
    )]
    OverlappingConditions {
        /// Description of the previously registered condition.
        existing: String,
        /// Description of the condition being added.
        added: String,
    },
}

/// Errors from handler distribution.
#[derive(Debug, Error)]
pub enum DistributionError {
    /// No registered predicate recognises the handler's shape.
    #[error("no distributor recognises a handler of type {type_name}")]
    UnrecognizedHandler {
        /// Type name of the unrecognised handler.
        type_name: &'static str,
    },

    /// Distribution did not reach a fixed point within the hop limit.
    ///
    /// Two distributors whose predicates each match the other's output shape
    /// would otherwise reinterpret a handler forever.
    #[error(
        "distribution of a handler of type {type_name} exceeded {max_hops} \
         reinterpretation hops"
    )]
    HopLimitExceeded {
        /// The configured hop bound.
        max_hops: usize,
        /// Type name of the originally distributed handler.
        type_name: &'static str,
    },

    /// A transform reported an error.
    #[error("distributor transform failed for a handler of type {type_name}: {source}")]
    TransformFailed {
        /// Type name of the handler handed to the transform.
        type_name: &'static str,
        /// The error the transform returned.
        source: BoxError,
    },
}

/// Errors from [`FilterMap`](crate::routing::FilterMap) lookups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterMapError {
    /// No predicate matched and no default value was configured.
    #[error("no predicate matched and no default value was set")]
    NoMatch,
}
