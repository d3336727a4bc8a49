//! The module trait and the init-phase context.

use serde::de::DeserializeOwned;

use std::sync::Arc;

use strand_core::distribution::HandlerDistributors;
use strand_core::error::MetaDataError;
use strand_core::foundation::MetaDataKey;

use crate::builder::BuilderState;
use crate::dependencies::DependencyRegistry;
use crate::error::BuildError;
use crate::extender::ChainExtender;

/// One unit of pipeline functionality.
///
/// Modules are the only way chains come into existence. The builder drives
/// every registered module through three phases, breadth-first — all modules
/// finish a phase before any module enters the next:
///
/// 1. [`init`](Module::init) — publish configuration metadata and handler
///    distributors, so that later phases of *other* modules can see them;
/// 2. [`configure`](Module::configure) — provide shared services and look up
///    services other modules provided;
/// 3. [`register`](Module::register) — create chains and extend chains other
///    modules created.
///
/// # Example
///
/// ```rust
/// use strand_core::error::BoxError;
/// use strand_core::foundation::MetaData;
/// use strand_core::metadata_key;
/// use strand_core::pipeline::{Action, ChainName};
/// use strand_framework::{BuildError, ChainExtender, Module};
///
/// metadata_key!(RESPONSE: String);
///
/// pub const RESPOND: ChainName = ChainName::new("RESPOND");
///
/// struct ResponderModule;
///
/// impl Module for ResponderModule {
///     fn name(&self) -> &'static str {
///         "responder"
///     }
///
///     fn register(&mut self, extender: &mut ChainExtender<'_>) -> Result<(), BuildError> {
///         extender.create_chain(RESPOND, Action::Consume, Action::Consume)?;
///         extender.append_processor(RESPOND, |metadata: &mut MetaData| -> Result<(), BoxError> {
///             metadata.set(RESPONSE, "ok".to_string());
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Module {
    /// The module's unique name, also the key of its configuration section.
    fn name(&self) -> &'static str;

    /// Publishes metadata and distributors. Runs first.
    fn init(&mut self, _context: &mut InitContext<'_>) -> Result<(), BuildError> {
        Ok(())
    }

    /// Provides and looks up shared services. Runs after every module's
    /// `init`.
    fn configure(&mut self, _dependencies: &mut DependencyRegistry) -> Result<(), BuildError> {
        Ok(())
    }

    /// Creates and extends chains. Runs last.
    fn register(&mut self, extender: &mut ChainExtender<'_>) -> Result<(), BuildError>;
}

/// What a module sees during its `init` phase.
pub struct InitContext<'a> {
    state: &'a mut BuilderState,
    config: &'a serde_json::Value,
    module: &'static str,
}

impl<'a> InitContext<'a> {
    pub(crate) fn new(
        state: &'a mut BuilderState,
        config: &'a serde_json::Value,
        module: &'static str,
    ) -> Self {
        Self {
            state,
            config,
            module,
        }
    }

    /// Publishes a process-wide configuration value.
    pub fn add_metadatum<T: Send + Sync + 'static>(&mut self, key: MetaDataKey<T>, value: T) {
        self.state.metadata.set(key, value);
    }

    /// Reads a configuration value an earlier module published.
    ///
    /// # Errors
    ///
    /// [`MetaDataError::KeyNotFound`] when no module set the slot yet.
    pub fn get_metadatum<T: Send + Sync + 'static>(
        &self,
        key: MetaDataKey<T>,
    ) -> Result<&T, MetaDataError> {
        self.state.metadata.get(key)
    }

    /// Reads a configuration value, or `None` when absent.
    pub fn get_optional_metadatum<T: Send + Sync + 'static>(
        &self,
        key: MetaDataKey<T>,
    ) -> Option<&T> {
        self.state.metadata.get_optional(key)
    }

    /// The handler distributor registry, for modules that teach the build
    /// new handler shapes.
    pub fn distributors(&mut self) -> &mut HandlerDistributors {
        &mut self.state.distributors
    }

    /// Registers a shared service early, before the `configure` phase.
    ///
    /// Equivalent to providing it in [`Module::configure`]; useful when the
    /// service is also needed to build this module's own distributors.
    pub fn provide<T: Send + Sync + 'static>(&mut self, service: Arc<T>) {
        self.state.dependencies.provide(service);
    }

    /// Deserializes this module's configuration section.
    ///
    /// Modules without a configured section see an empty object, so configs
    /// whose fields all have defaults load cleanly.
    ///
    /// # Errors
    ///
    /// [`BuildError::InvalidConfig`] when the section does not fit `T`.
    pub fn config<T: DeserializeOwned>(&self) -> Result<T, BuildError> {
        serde_json::from_value(self.config.clone()).map_err(|source| BuildError::InvalidConfig {
            module: self.module,
            source,
        })
    }

    /// The name of the module being initialized.
    pub fn module(&self) -> &'static str {
        self.module
    }
}
