//! The register-phase view of the build state.

use std::sync::Arc;

use strand_core::distribution::HandlerEnvelope;
use strand_core::error::MetaDataError;
use strand_core::foundation::{MetaData, MetaDataKey};
use strand_core::pipeline::{Action, Chain, ChainName, JumpRule, Processor};

use crate::builder::{BuilderState, ChainSlot};
use crate::error::BuildError;

/// What a module sees during its `register` phase.
///
/// The extender tracks which module created each chain, so the ownership
/// rule — a chain is created exactly once, but any module may extend it — is
/// enforced with a precise error naming both parties.
pub struct ChainExtender<'a> {
    state: &'a mut BuilderState,
    module: &'static str,
}

impl<'a> ChainExtender<'a> {
    pub(crate) fn new(state: &'a mut BuilderState, module: &'static str) -> Self {
        Self { state, module }
    }

    /// Creates a chain owned by the current module.
    ///
    /// # Errors
    ///
    /// [`BuildError::DuplicateChain`] when any module already created a chain
    /// of this name.
    pub fn create_chain(
        &mut self,
        name: ChainName,
        on_success: Action,
        on_exception: Action,
    ) -> Result<(), BuildError> {
        if let Some(slot) = self.state.chains.get(&name) {
            return Err(BuildError::DuplicateChain {
                name,
                existing_owner: slot.owner,
                module: self.module,
            });
        }
        self.state.chains.insert(
            name,
            ChainSlot {
                chain: Chain::new(name, on_success, on_exception),
                owner: self.module,
            },
        );
        Ok(())
    }

    /// Appends a processor to an existing chain.
    ///
    /// # Errors
    ///
    /// [`BuildError::UnknownChain`] when no module created `name`.
    pub fn append_processor(
        &mut self,
        name: ChainName,
        processor: impl Processor + 'static,
    ) -> Result<(), BuildError> {
        self.chain_mut(name)?.append_processor(processor);
        Ok(())
    }

    /// Appends a conditional jump rule to an existing chain.
    pub fn add_jump_rule(&mut self, name: ChainName, rule: JumpRule) -> Result<(), BuildError> {
        self.chain_mut(name)?.add_jump_rule(rule);
        Ok(())
    }

    /// Jumps from `name` to `target` whenever the given slot is set.
    pub fn route_if_set<T: 'static>(
        &mut self,
        name: ChainName,
        key: MetaDataKey<T>,
        target: ChainName,
    ) -> Result<(), BuildError> {
        self.add_jump_rule(name, JumpRule::if_set(key, target))
    }

    /// Jumps from `name` to `target` whenever the given flag is `true`.
    pub fn route_if_flag_is_set(
        &mut self,
        name: ChainName,
        key: MetaDataKey<bool>,
        target: ChainName,
    ) -> Result<(), BuildError> {
        self.add_jump_rule(name, JumpRule::if_flag_is_set(key, target))
    }

    /// Publishes a process-wide configuration value.
    pub fn add_metadatum<T: Send + Sync + 'static>(&mut self, key: MetaDataKey<T>, value: T) {
        self.state.metadata.set(key, value);
    }

    /// Reads a process-wide configuration value.
    ///
    /// # Errors
    ///
    /// [`MetaDataError::KeyNotFound`] when no module set the slot.
    pub fn get_metadatum<T: Send + Sync + 'static>(
        &self,
        key: MetaDataKey<T>,
    ) -> Result<&T, MetaDataError> {
        self.state.metadata.get(key)
    }

    /// Mutable access to the build-time metadata, for registries modules
    /// assemble across several phases.
    pub fn metadata_mut(&mut self) -> &mut MetaData {
        &mut self.state.metadata
    }

    /// Looks up a service provided during the `configure` phase.
    pub fn dependency<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.state.dependencies.lookup::<T>()
    }

    /// Registers a teardown callback run when the registry shuts down.
    pub fn on_close(&mut self, action: impl FnOnce() + Send + 'static) {
        self.state.closing.register(action);
    }

    /// Hands a handler to the distributor registry.
    ///
    /// # Errors
    ///
    /// [`BuildError::Distribution`] when no distributor recognizes the
    /// handler or a transform fails.
    pub fn distribute(&mut self, handler: HandlerEnvelope) -> Result<(), BuildError> {
        let state = &mut *self.state;
        state
            .distributors
            .distribute(handler, &mut state.metadata)?;
        Ok(())
    }

    /// The name of the module currently registering.
    pub fn module(&self) -> &'static str {
        self.module
    }

    fn chain_mut(&mut self, name: ChainName) -> Result<&mut Chain, BuildError> {
        let module = self.module;
        self.state
            .chains
            .get_mut(&name)
            .map(|slot| &mut slot.chain)
            .ok_or(BuildError::UnknownChain { name, module })
    }
}
