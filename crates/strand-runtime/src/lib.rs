//! # Strand Runtime
//!
//! Process-level concerns of the Strand pipeline framework: layered
//! configuration loading, logging setup, and the runtime lifecycle that ties
//! modules, configuration, and the frozen chain registry together.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strand_runtime::StrandRuntime;
//!
//! let runtime = StrandRuntime::builder()
//!     .with_module(RouterModule::new())
//!     .with_module(ExceptionModule::new())
//!     .start()?;
//! ```
//!
//! Configuration is loaded from `strand.toml` and `STRAND_*` environment
//! variables; each module's section is delivered to the module of that name
//! during the build. See [`config`] for the layering rules.

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{LogFormat, LogOutput, LoggingConfig, StrandConfig};
pub use error::{ConfigError, ConfigResult, RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use runtime::{StrandRuntime, StrandRuntimeBuilder};
