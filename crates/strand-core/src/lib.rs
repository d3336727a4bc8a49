//! # Strand Core
//!
//! The core execution engine of the Strand pipeline framework.
//!
//! This crate provides the fundamental building blocks of Strand: the typed
//! metadata context, chains of processors, the frozen chain registry, and the
//! routing and distribution registries modules populate at build time.
//!
//! ## Architecture Layers
//!
//! Strand Core is organized into four concerns:
//!
//! ### Foundation
//!
//! The typed context every request travels in:
//! - **Metadata slots**: heterogeneous, key-typed storage ([`MetaData`],
//!   [`MetaDataKey`], [`metadata_key!`])
//!
//! ### Pipeline
//!
//! Execution of a context through the chain graph:
//! - **Processors**: the atomic unit of work ([`Processor`])
//! - **Chains**: named processor sequences with terminal rules ([`Chain`],
//!   [`Action`], [`JumpRule`])
//! - **Registry**: the frozen chain table and executor ([`ChainRegistry`],
//!   [`ChainConsumer`])
//!
//! ### Routing
//!
//! Selecting handlers and values from the context:
//! - **Conditions**: predicates over the context ([`ContextCondition`])
//! - **Generators**: first-match value registries with shadowing detection
//!   ([`Generators`])
//! - **Filter maps**: predicate-keyed lookup with a fallback ([`FilterMap`])
//!
//! ### Distribution
//!
//! Normalizing arbitrary handler shapes into registered ones
//! ([`HandlerDistributors`], [`HandlerEnvelope`]).
//!
//! ## Execution Model
//!
//! A request becomes a [`MetaData`] context and is driven through the chain
//! graph by [`ChainRegistry::put_into_chain`]:
//!
//! ```text
//! ┌─────────┐  jump   ┌─────────┐  jump   ┌─────────┐
//! │  INIT   │────────▶│ PROCESS │────────▶│ RESPOND │──▶ consume
//! └─────────┘         └────┬────┘         └─────────┘
//!                          │ processor failed
//!                          ▼
//!                     ┌─────────┐
//!                     │ ERRORS  │──▶ consume
//!                     └─────────┘
//! ```
//!
//! Execution is synchronous: processors run on the calling thread, and
//! concurrency arises only from multiple threads driving independent contexts
//! through a shared registry.
//!
//! ## Example
//!
//! ```rust
//! use strand_core::closing::ClosingActions;
//! use strand_core::error::BoxError;
//! use strand_core::foundation::MetaData;
//! use strand_core::metadata_key;
//! use strand_core::pipeline::{
//!     Action, Chain, ChainName, ChainRegistry, SplitConsumer,
//! };
//!
//! metadata_key!(RESPONSE: String);
//!
//! const PROCESS: ChainName = ChainName::new("PROCESS");
//!
//! let mut process = Chain::new(PROCESS, Action::Consume, Action::Consume);
//! process.append_processor(|metadata: &mut MetaData| -> Result<(), BoxError> {
//!     metadata.set(RESPONSE, "hello".to_string());
//!     Ok(())
//! });
//!
//! let registry = ChainRegistry::from_parts(
//!     [(PROCESS, process)].into_iter().collect(),
//!     MetaData::new(),
//!     ClosingActions::new(),
//! );
//!
//! registry
//!     .put_into_chain(
//!         PROCESS,
//!         MetaData::new(),
//!         SplitConsumer::new(
//!             |metadata: MetaData| assert_eq!(metadata.get(RESPONSE).unwrap(), "hello"),
//!             |_| panic!("no failure expected"),
//!         ),
//!     )
//!     .unwrap();
//! ```

pub mod closing;
pub mod distribution;
pub mod error;
pub mod foundation;
pub mod pipeline;
pub mod routing;

// Re-export foundation types
pub use foundation::{MetaData, MetaDataKey};

// Re-export pipeline types
pub use pipeline::{
    Action, BoxedProcessor, Chain, ChainConsumer, ChainName, ChainRegistry, DiscardingConsumer,
    EXCEPTION, JumpRule, Processor, SplitConsumer,
};

// Re-export routing and distribution types
pub use distribution::{HandlerDistributors, HandlerEnvelope, MAX_DISTRIBUTION_HOPS};
pub use routing::{
    CAPTURED_PARAMETERS, ContextCondition, FilterMap, GenerationCondition, Generators,
    PathTemplate,
};

pub use closing::ClosingActions;
pub use error::{
    BoxError, DistributionError, ExecutionError, FilterMapError, MetaDataError, PipelineError,
    RoutingError,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::error::BoxError;
    pub use super::foundation::{MetaData, MetaDataKey};
    pub use super::pipeline::{
        Action, Chain, ChainConsumer, ChainName, ChainRegistry, DiscardingConsumer, EXCEPTION,
        JumpRule, Processor, SplitConsumer,
    };
    pub use super::routing::{ContextCondition, FilterMap, Generators, PathTemplate};
}
