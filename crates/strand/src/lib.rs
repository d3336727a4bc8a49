//! # Strand
//!
//! A modular, type-safe chain-of-responsibility pipeline framework for Rust.
//!
//! ## Overview
//!
//! Strand turns request processing into a graph of named **chains**, each an
//! ordered list of **processors** that communicate exclusively through a
//! typed **metadata** context. Functionality is packaged into **modules**
//! that build the graph cooperatively, so cross-cutting concerns — routing,
//! authentication, serialization, error mapping — compose without knowing
//! about each other.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐  MetaData  ┌─────────────────────────────────────┐
//! │ Adapter  │───────────▶│ ChainRegistry                       │
//! │ (HTTP,   │            │  ┌──────┐   ┌─────────┐   ┌───────┐ │
//! │  queue,  │            │  │ INIT │──▶│ PROCESS │──▶│RESPOND│─┼──▶ consumer
//! │  cron)   │◀───────────│  └──────┘   └────┬────┘   └───────┘ │
//! └──────────┘  response  │                  ▼ on failure       │
//!                         │              ┌────────┐             │
//!                         │              │ ERRORS │             │
//!                         │              └────────┘             │
//!                         └─────────────────────────────────────┘
//! ```
//!
//! - **Processors**: the atomic unit of work; failure redirects the run into
//!   the owning chain's exception path instead of aborting
//! - **Chains**: named processor sequences with jump rules and terminal
//!   actions
//! - **Modules**: build the graph in three breadth-first phases
//!   (`init` → `configure` → `register`)
//! - **Runtime**: configuration loading, logging, and lifecycle
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strand::prelude::*;
//!
//! const ECHO: ChainName = ChainName::new("ECHO");
//!
//! struct EchoModule;
//!
//! impl Module for EchoModule {
//!     fn name(&self) -> &'static str {
//!         "echo"
//!     }
//!
//!     fn register(&mut self, extender: &mut ChainExtender<'_>) -> Result<(), BuildError> {
//!         extender.create_chain(ECHO, Action::Consume, Action::Consume)?;
//!         extender.append_processor(ECHO, |metadata: &mut MetaData| -> Result<(), BoxError> {
//!             metadata.set(RESPONSE, "pong".to_string());
//!             Ok(())
//!         })
//!     }
//! }
//!
//! let runtime = StrandRuntime::builder().with_module(EchoModule).start()?;
//! ```

pub use strand_core as core;
pub use strand_framework as framework;
pub use strand_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use strand::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use strand_runtime::{StrandConfig, StrandRuntime, StrandRuntimeBuilder};

    // Module system - primary unit of pipeline functionality
    pub use strand_framework::{
        BuildError, ChainExtender, ChainRegistryBuilder, DependencyRegistry, InitContext, Module,
    };

    // Core engine
    pub use strand_core::error::{BoxError, PipelineError};
    pub use strand_core::foundation::{MetaData, MetaDataKey};
    pub use strand_core::metadata_key;
    pub use strand_core::pipeline::{
        Action, Chain, ChainConsumer, ChainName, ChainRegistry, DiscardingConsumer, EXCEPTION,
        JumpRule, Processor, SplitConsumer,
    };
    pub use strand_core::routing::{
        CAPTURED_PARAMETERS, ContextCondition, FilterMap, GenerationCondition, Generators,
        PathTemplate,
    };
    pub use strand_core::distribution::{HandlerDistributors, HandlerEnvelope};
}
