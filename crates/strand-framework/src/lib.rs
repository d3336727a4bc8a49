//! # Strand Framework
//!
//! The module system of the Strand pipeline framework.
//!
//! Where `strand-core` executes frozen chain graphs, this crate is how those
//! graphs come into existence: application and infrastructure functionality
//! is packaged into [`Module`]s, and [`ChainRegistryBuilder`] drives every
//! registered module through three breadth-first phases to produce a
//! [`ChainRegistry`](strand_core::pipeline::ChainRegistry).
//!
//! ## Build Phases
//!
//! ```text
//! ┌──────┐    ┌───────────┐    ┌──────────┐
//! │ init │───▶│ configure │───▶│ register │───▶ frozen registry
//! └──────┘    └───────────┘    └──────────┘
//!  metadata,    shared           chains,
//!  distributors services         processors,
//!                                jump rules
//! ```
//!
//! All modules finish a phase before any module enters the next, so a module
//! may depend on anything any other module published in an earlier phase —
//! composition order never matters across phases.
//!
//! ## Chain Ownership
//!
//! A chain is created exactly once, by the module that owns it; any module
//! may append processors or jump rules to any existing chain. Duplicate
//! creations, extensions of nonexistent chains, and jumps to nonexistent
//! chains are all rejected at build time.

mod builder;
mod dependencies;
mod error;
mod extender;
mod module;

pub use builder::ChainRegistryBuilder;
pub use dependencies::DependencyRegistry;
pub use error::{BuildError, BuildPhase};
pub use extender::ChainExtender;
pub use module::{InitContext, Module};
