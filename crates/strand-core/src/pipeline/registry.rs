//! The chain registry: frozen chain table and pipeline execution.
//!
//! [`ChainRegistry`] owns the frozen map from [`ChainName`] to [`Chain`], the
//! process-wide configuration metadata, and the registered closing actions.
//! It is produced once at build time and treated as read-only for the rest of
//! the process, so it can be shared freely (e.g. behind an `Arc`) between the
//! threads of an embedding transport adapter.
//!
//! # Execution model
//!
//! [`put_into_chain`](ChainRegistry::put_into_chain) is synchronous: it
//! executes processors on the calling thread and invokes the terminal
//! consumer before returning. Concurrency arises only from callers driving
//! independent contexts through the registry concurrently — each run owns its
//! [`MetaData`], so no locking is involved.
//!
//! # Failure containment
//!
//! A failing processor never aborts a run and never propagates to the caller.
//! The failure is recorded in the [`EXCEPTION`] slot and control follows the
//! owning chain's exception action, so a misbehaving handler cannot crash the
//! transport adapter that invoked the pipeline.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{Level, debug, span, trace, warn};

use crate::closing::ClosingActions;
use crate::error::{ExecutionError, MetaDataError, PipelineError};
use crate::foundation::{MetaData, MetaDataKey};
use crate::metadata_key;
use crate::pipeline::chain::{Action, Chain, ChainName};
use crate::pipeline::consumer::ChainConsumer;

metadata_key!(
    /// Well-known slot holding the caught failure of the current run.
    pub EXCEPTION: PipelineError
);

/// The frozen pipeline: all chains, the process-wide metadata, and the
/// closing actions registered during the build.
#[derive(Debug)]
pub struct ChainRegistry {
    chains: HashMap<ChainName, Chain>,
    metadata: MetaData,
    closing: ClosingActions,
}

impl ChainRegistry {
    /// Assembles a registry from already-validated parts.
    ///
    /// This is the freeze step of a builder; it performs no validation of its
    /// own. Application code should construct registries through
    /// `strand_framework::ChainRegistryBuilder`, which rejects dangling jump
    /// targets and duplicate chain names before calling this.
    pub fn from_parts(
        chains: HashMap<ChainName, Chain>,
        metadata: MetaData,
        closing: ClosingActions,
    ) -> Self {
        Self {
            chains,
            metadata,
            closing,
        }
    }

    /// Drives one context through the pipeline, starting at `start`.
    ///
    /// Processors execute strictly in registration order. When one fails, the
    /// failure is stored in [`EXCEPTION`] and the current chain's exception
    /// action is taken instead of its success path. Jumps transfer control to
    /// the target chain; `Consume` and `Drop` end the run and hand the final
    /// context to exactly one of the consumer's callbacks, selected by the
    /// `EXCEPTION` slot.
    ///
    /// Jump cycles are not guarded against; a registry whose chains form a
    /// cycle is a configuration bug of the modules that built it.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::UnknownChain`] when `start` names no registered
    /// chain. Processor failures are not errors of this method.
    pub fn put_into_chain<C: ChainConsumer>(
        &self,
        start: ChainName,
        mut metadata: MetaData,
        consumer: C,
    ) -> Result<(), ExecutionError> {
        let mut chain = self
            .chains
            .get(&start)
            .ok_or(ExecutionError::UnknownChain(start))?;

        loop {
            let hop_span = span!(Level::DEBUG, "chain", chain = %chain.name());
            let _enter = hop_span.enter();

            let action = match self.run_processors(chain, &mut metadata) {
                Ok(()) => chain
                    .jump_rules()
                    .iter()
                    .find(|rule| rule.matches(&metadata))
                    .map(|rule| {
                        trace!(rule = rule.description(), target = %rule.target(), "Jump rule matched");
                        Action::Jump(rule.target())
                    })
                    .unwrap_or_else(|| chain.on_success()),
                Err(error) => {
                    warn!(error = %error, "Processor failed, taking exception path");
                    metadata.set(EXCEPTION, error);
                    chain.on_exception()
                }
            };

            match action {
                Action::Jump(target) => {
                    chain = self
                        .chains
                        .get(&target)
                        .ok_or(ExecutionError::UnknownChain(target))?;
                }
                Action::Consume => {
                    return Ok(Self::finish(metadata, consumer));
                }
                Action::Drop => {
                    debug!(chain = %chain.name(), "Context dropped (fire-and-forget)");
                    return Ok(Self::finish(metadata, consumer));
                }
            }
        }
    }

    fn run_processors(&self, chain: &Chain, metadata: &mut MetaData) -> Result<(), PipelineError> {
        for (index, processor) in chain.processors().iter().enumerate() {
            let outcome = catch_unwind(AssertUnwindSafe(|| processor.apply(metadata)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(source)) => {
                    return Err(PipelineError::Processor {
                        chain: chain.name(),
                        index,
                        source,
                    });
                }
                Err(panic) => {
                    return Err(PipelineError::Panic {
                        chain: chain.name(),
                        index,
                        message: panic_message(panic),
                    });
                }
            }
        }
        Ok(())
    }

    fn finish<C: ChainConsumer>(metadata: MetaData, consumer: C) {
        if metadata.contains(EXCEPTION) {
            consumer.on_failure(metadata);
        } else {
            consumer.on_success(metadata);
        }
    }

    /// Reads a process-wide configuration slot.
    ///
    /// # Errors
    ///
    /// [`MetaDataError::KeyNotFound`] when the slot was never populated
    /// during the build.
    pub fn get_metadatum<T: Send + Sync + 'static>(
        &self,
        key: MetaDataKey<T>,
    ) -> Result<&T, MetaDataError> {
        self.metadata.get(key)
    }

    /// Reads a process-wide configuration slot, or `None` when absent.
    pub fn get_optional_metadatum<T: Send + Sync + 'static>(
        &self,
        key: MetaDataKey<T>,
    ) -> Option<&T> {
        self.metadata.get_optional(key)
    }

    /// Returns the number of registered chains.
    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    /// Renders the chain graph for diagnostics.
    ///
    /// Nodes are chains, edges are jump targets. The output is a pure
    /// function of the frozen registry, so repeated calls yield identical
    /// text.
    pub fn dump(&self) -> String {
        let mut names: Vec<&ChainName> = self.chains.keys().collect();
        names.sort_by_key(|name| name.as_str());

        let mut out = String::new();
        for name in names {
            let chain = &self.chains[name];
            out.push_str(&format!(
                "chain {} ({} processors)\n",
                chain.name(),
                chain.processor_count()
            ));
            for rule in chain.jump_rules() {
                out.push_str(&format!(
                    "  if {} -> jump {}\n",
                    rule.description(),
                    rule.target()
                ));
            }
            out.push_str(&format!("  on success -> {}\n", chain.on_success()));
            out.push_str(&format!("  on exception -> {}\n", chain.on_exception()));
        }
        out
    }

    /// Runs the registered closing actions.
    ///
    /// Idempotent; also invoked when the registry is dropped.
    pub fn close(&self) {
        self.closing.close();
    }
}

impl Drop for ChainRegistry {
    fn drop(&mut self) {
        self.closing.close();
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
