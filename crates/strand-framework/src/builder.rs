//! Assembling a frozen chain registry from modules.

use tracing::{Level, debug, span};

use std::collections::HashMap;

use strand_core::closing::ClosingActions;
use strand_core::distribution::HandlerDistributors;
use strand_core::foundation::MetaData;
use strand_core::pipeline::{Action, Chain, ChainName, ChainRegistry};

use crate::error::BuildError;
use crate::extender::ChainExtender;
use crate::module::{InitContext, Module};

/// Everything accumulated while modules build the registry.
pub(crate) struct BuilderState {
    pub(crate) metadata: MetaData,
    pub(crate) dependencies: crate::dependencies::DependencyRegistry,
    pub(crate) distributors: HandlerDistributors,
    pub(crate) chains: HashMap<ChainName, ChainSlot>,
    pub(crate) closing: ClosingActions,
}

pub(crate) struct ChainSlot {
    pub(crate) chain: Chain,
    pub(crate) owner: &'static str,
}

/// Builds a [`ChainRegistry`] by driving modules through the three build
/// phases.
///
/// Modules run in registration order within each phase, and the phases run
/// breadth-first: every module's `init` completes before any module's
/// `configure`, and every `configure` before any `register`. A module can
/// therefore rely on metadata, distributors, and services published by *any*
/// other module, regardless of registration order.
///
/// # Example
///
/// ```rust
/// use strand_core::error::BoxError;
/// use strand_core::foundation::MetaData;
/// use strand_core::pipeline::{Action, ChainName, DiscardingConsumer};
/// use strand_framework::{BuildError, ChainExtender, ChainRegistryBuilder, Module};
///
/// const PROCESS: ChainName = ChainName::new("PROCESS");
///
/// struct ProcessModule;
///
/// impl Module for ProcessModule {
///     fn name(&self) -> &'static str {
///         "process"
///     }
///
///     fn register(&mut self, extender: &mut ChainExtender<'_>) -> Result<(), BuildError> {
///         extender.create_chain(PROCESS, Action::Consume, Action::Consume)
///     }
/// }
///
/// let registry = ChainRegistryBuilder::new()
///     .with_module(ProcessModule)
///     .build()
///     .unwrap();
/// registry
///     .put_into_chain(PROCESS, MetaData::new(), DiscardingConsumer)
///     .unwrap();
/// ```
pub struct ChainRegistryBuilder {
    modules: Vec<Box<dyn Module>>,
    configs: HashMap<String, serde_json::Value>,
}

impl ChainRegistryBuilder {
    /// Creates a builder with no modules.
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            configs: HashMap::new(),
        }
    }

    /// Registers a module. Order matters within each build phase.
    pub fn with_module(mut self, module: impl Module + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    /// Registers a module only when `enabled` is true.
    ///
    /// This keeps feature toggles at the composition site instead of inside
    /// every module.
    pub fn with_optional_module(self, enabled: bool, module: impl Module + 'static) -> Self {
        if enabled { self.with_module(module) } else { self }
    }

    /// Sets the configuration section for the module named `module`.
    pub fn with_module_config(
        mut self,
        module: impl Into<String>,
        config: serde_json::Value,
    ) -> Self {
        self.configs.insert(module.into(), config);
        self
    }

    /// Sets configuration sections for several modules at once, typically
    /// the `modules` table of a loaded configuration file.
    pub fn with_module_configs(
        mut self,
        configs: HashMap<String, serde_json::Value>,
    ) -> Self {
        self.configs.extend(configs);
        self
    }

    /// Runs the three build phases and freezes the registry.
    ///
    /// # Errors
    ///
    /// Any [`BuildError`]; the registry is only produced when every module
    /// succeeded in every phase and no chain reference dangles.
    pub fn build(self) -> Result<ChainRegistry, BuildError> {
        let Self {
            mut modules,
            configs,
        } = self;

        let mut state = BuilderState {
            metadata: MetaData::new(),
            dependencies: crate::dependencies::DependencyRegistry::new(),
            distributors: HandlerDistributors::new(),
            chains: HashMap::new(),
            closing: ClosingActions::new(),
        };

        let empty = serde_json::Value::Object(serde_json::Map::new());
        for module in &mut modules {
            let phase_span = span!(Level::DEBUG, "init", module = module.name());
            let _enter = phase_span.enter();
            let config = configs.get(module.name()).unwrap_or(&empty);
            module.init(&mut InitContext::new(&mut state, config, module.name()))?;
        }

        for module in &mut modules {
            let phase_span = span!(Level::DEBUG, "configure", module = module.name());
            let _enter = phase_span.enter();
            module.configure(&mut state.dependencies)?;
        }

        for module in &mut modules {
            let phase_span = span!(Level::DEBUG, "register", module = module.name());
            let _enter = phase_span.enter();
            module.register(&mut ChainExtender::new(&mut state, module.name()))?;
        }

        validate_jump_targets(&state.chains)?;

        let chains = state
            .chains
            .into_iter()
            .map(|(name, slot)| (name, slot.chain))
            .collect::<HashMap<_, _>>();
        debug!(
            modules = modules.len(),
            chains = chains.len(),
            "Chain registry built"
        );
        Ok(ChainRegistry::from_parts(
            chains,
            state.metadata,
            state.closing,
        ))
    }
}

impl Default for ChainRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejects registries whose chain graph references nonexistent chains, so a
/// dangling jump surfaces at build time instead of mid-request.
fn validate_jump_targets(chains: &HashMap<ChainName, ChainSlot>) -> Result<(), BuildError> {
    for (name, slot) in chains {
        let mut targets = Vec::new();
        if let Action::Jump(target) = slot.chain.on_success() {
            targets.push(target);
        }
        if let Action::Jump(target) = slot.chain.on_exception() {
            targets.push(target);
        }
        targets.extend(slot.chain.jump_rules().iter().map(|rule| rule.target()));

        for target in targets {
            if !chains.contains_key(&target) {
                return Err(BuildError::DanglingJumpTarget {
                    chain: *name,
                    target,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::DependencyRegistry;

    use serde::Deserialize;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use strand_core::error::BoxError;
    use strand_core::metadata_key;
    use strand_core::pipeline::SplitConsumer;

    metadata_key!(GREETING: String);
    metadata_key!(RESPONSE: String);

    const INIT: ChainName = ChainName::new("INIT");
    const RESPOND: ChainName = ChainName::new("RESPOND");

    struct Greeter {
        greeting: &'static str,
    }

    /// Creates INIT -> RESPOND and publishes the greeting as metadata.
    struct CoreModule;

    impl Module for CoreModule {
        fn name(&self) -> &'static str {
            "core"
        }

        fn init(&mut self, context: &mut InitContext<'_>) -> Result<(), BuildError> {
            context.add_metadatum(GREETING, "hello".to_string());
            Ok(())
        }

        fn configure(&mut self, dependencies: &mut DependencyRegistry) -> Result<(), BuildError> {
            dependencies.provide(Arc::new(Greeter { greeting: "hello" }));
            Ok(())
        }

        fn register(&mut self, extender: &mut ChainExtender<'_>) -> Result<(), BuildError> {
            extender.create_chain(INIT, Action::Jump(RESPOND), Action::Consume)?;
            extender.create_chain(RESPOND, Action::Consume, Action::Consume)
        }
    }

    /// Extends RESPOND using the service CoreModule provided, even though it
    /// is registered first.
    struct ResponderModule;

    impl Module for ResponderModule {
        fn name(&self) -> &'static str {
            "responder"
        }

        fn register(&mut self, extender: &mut ChainExtender<'_>) -> Result<(), BuildError> {
            let greeter = extender
                .dependency::<Greeter>()
                .ok_or_else(|| BuildError::Module {
                    module: "responder",
                    phase: crate::error::BuildPhase::Register,
                    source: "greeter service missing".into(),
                })?;
            extender.append_processor(RESPOND, move |metadata: &mut MetaData| -> Result<(), BoxError> {
                metadata.set(RESPONSE, greeter.greeting.to_string());
                Ok(())
            })
        }
    }

    #[test]
    fn test_modules_compose_across_phases_regardless_of_order() {
        // ResponderModule registers before CoreModule but still sees the
        // chain and service CoreModule contributes.
        let registry = ChainRegistryBuilder::new()
            .with_module(ResponderModule)
            .with_module(CoreModule)
            .build()
            .unwrap();

        assert_eq!(registry.chain_count(), 2);
        assert_eq!(registry.get_metadatum(GREETING).unwrap(), "hello");

        let successes = Arc::new(AtomicUsize::new(0));
        let successes_clone = Arc::clone(&successes);
        registry
            .put_into_chain(
                INIT,
                MetaData::new(),
                SplitConsumer::new(
                    move |metadata: MetaData| {
                        assert_eq!(metadata.get(RESPONSE).unwrap(), "hello");
                        successes_clone.fetch_add(1, Ordering::SeqCst);
                    },
                    |_| panic!("must not reach the failure path"),
                ),
            )
            .unwrap();
        assert_eq!(successes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_duplicate_chain_names_both_owners() {
        struct Usurper;
        impl Module for Usurper {
            fn name(&self) -> &'static str {
                "usurper"
            }
            fn register(&mut self, extender: &mut ChainExtender<'_>) -> Result<(), BuildError> {
                extender.create_chain(INIT, Action::Consume, Action::Consume)
            }
        }

        let error = ChainRegistryBuilder::new()
            .with_module(CoreModule)
            .with_module(Usurper)
            .build()
            .unwrap_err();
        match error {
            BuildError::DuplicateChain {
                name,
                existing_owner,
                module,
            } => {
                assert_eq!(name, INIT);
                assert_eq!(existing_owner, "core");
                assert_eq!(module, "usurper");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extending_a_chain_nobody_created_fails() {
        let error = ChainRegistryBuilder::new()
            .with_module(ResponderModule)
            .build()
            .unwrap_err();
        assert!(matches!(error, BuildError::Module { module: "responder", .. }));

        struct Extender;
        impl Module for Extender {
            fn name(&self) -> &'static str {
                "extender"
            }
            fn register(&mut self, extender: &mut ChainExtender<'_>) -> Result<(), BuildError> {
                extender.append_processor(RESPOND, |_: &mut MetaData| -> Result<(), BoxError> {
                    Ok(())
                })
            }
        }
        let error = ChainRegistryBuilder::new()
            .with_module(Extender)
            .build()
            .unwrap_err();
        assert!(matches!(
            error,
            BuildError::UnknownChain {
                name: RESPOND,
                module: "extender"
            }
        ));
    }

    #[test]
    fn test_dangling_jump_target_is_rejected() {
        struct Dangling;
        impl Module for Dangling {
            fn name(&self) -> &'static str {
                "dangling"
            }
            fn register(&mut self, extender: &mut ChainExtender<'_>) -> Result<(), BuildError> {
                extender.create_chain(INIT, Action::Jump(RESPOND), Action::Consume)
            }
        }

        let error = ChainRegistryBuilder::new()
            .with_module(Dangling)
            .build()
            .unwrap_err();
        assert!(matches!(
            error,
            BuildError::DanglingJumpTarget {
                chain: INIT,
                target: RESPOND
            }
        ));
    }

    #[test]
    fn test_optional_module_is_skipped_when_disabled() {
        let registry = ChainRegistryBuilder::new()
            .with_module(CoreModule)
            .with_optional_module(false, ResponderModule)
            .build()
            .unwrap();
        assert_eq!(registry.chain_count(), 2);
    }

    #[test]
    fn test_module_config_sections_are_delivered() {
        #[derive(Deserialize)]
        struct EchoConfig {
            prefix: String,
        }

        struct ConfiguredModule;
        impl Module for ConfiguredModule {
            fn name(&self) -> &'static str {
                "echo"
            }
            fn init(&mut self, context: &mut InitContext<'_>) -> Result<(), BuildError> {
                let config: EchoConfig = context.config()?;
                context.add_metadatum(GREETING, config.prefix);
                Ok(())
            }
            fn register(&mut self, extender: &mut ChainExtender<'_>) -> Result<(), BuildError> {
                extender.create_chain(INIT, Action::Consume, Action::Consume)
            }
        }

        let registry = ChainRegistryBuilder::new()
            .with_module(ConfiguredModule)
            .with_module_config("echo", serde_json::json!({ "prefix": "[bot]" }))
            .build()
            .unwrap();
        assert_eq!(registry.get_metadatum(GREETING).unwrap(), "[bot]");

        let error = ChainRegistryBuilder::new()
            .with_module(ConfiguredModule)
            .build()
            .unwrap_err();
        assert!(matches!(error, BuildError::InvalidConfig { module: "echo", .. }));
    }
}
