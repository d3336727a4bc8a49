//! Runtime lifecycle: configuration, logging, build, shutdown.

use tracing::info;

use std::path::PathBuf;
use std::sync::Arc;

use strand_core::pipeline::ChainRegistry;
use strand_framework::{ChainRegistryBuilder, Module};

use crate::config::StrandConfig;
use crate::error::RuntimeResult;
use crate::logging;

/// A started Strand runtime: the frozen registry plus lifecycle control.
///
/// The registry is held behind an `Arc`, so transport adapters on any number
/// of threads can clone it and drive requests concurrently.
///
/// # Example
///
/// ```rust,ignore
/// use strand_runtime::StrandRuntime;
///
/// let runtime = StrandRuntime::builder()
///     .with_module(RouterModule::new())
///     .with_module(ExceptionModule::new())
///     .start()?;
///
/// let registry = Arc::clone(runtime.registry());
/// // hand `registry` to transport adapters...
///
/// runtime.shutdown();
/// ```
pub struct StrandRuntime {
    registry: Arc<ChainRegistry>,
}

impl StrandRuntime {
    /// Starts configuring a runtime.
    pub fn builder() -> StrandRuntimeBuilder {
        StrandRuntimeBuilder::new()
    }

    /// The frozen chain registry.
    pub fn registry(&self) -> &Arc<ChainRegistry> {
        &self.registry
    }

    /// Runs the registered closing actions and drops the runtime's handle on
    /// the registry.
    ///
    /// Adapters still holding a clone of the registry keep it alive, but the
    /// closing actions run exactly once.
    pub fn shutdown(self) {
        info!("Shutting down Strand runtime");
        self.registry.close();
    }
}

/// Builds a [`StrandRuntime`] from modules and configuration.
pub struct StrandRuntimeBuilder {
    registry: ChainRegistryBuilder,
    config: Option<StrandConfig>,
    config_path: Option<PathBuf>,
    logging: bool,
}

impl StrandRuntimeBuilder {
    /// Creates a builder with no modules and default configuration sources.
    pub fn new() -> Self {
        Self {
            registry: ChainRegistryBuilder::new(),
            config: None,
            config_path: None,
            logging: true,
        }
    }

    /// Registers a module.
    pub fn with_module(mut self, module: impl Module + 'static) -> Self {
        self.registry = self.registry.with_module(module);
        self
    }

    /// Registers a module only when `enabled` is true.
    pub fn with_optional_module(mut self, enabled: bool, module: impl Module + 'static) -> Self {
        self.registry = self.registry.with_optional_module(enabled, module);
        self
    }

    /// Uses an already-loaded configuration instead of loading one.
    pub fn with_config(mut self, config: StrandConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Loads configuration from `path` instead of the default location.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Skips logging initialization, for embedders that set up their own
    /// subscriber.
    pub fn disable_logging(mut self) -> Self {
        self.logging = false;
        self
    }

    /// Loads configuration, initializes logging, and builds the registry.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Config`](crate::error::RuntimeError::Config) when the
    /// configuration fails to load,
    /// [`RuntimeError::Build`](crate::error::RuntimeError::Build) when a
    /// module fails or the chain graph is invalid.
    pub fn start(self) -> RuntimeResult<StrandRuntime> {
        let config = match self.config {
            Some(config) => config,
            None => match &self.config_path {
                Some(path) => StrandConfig::from_file(path)?,
                None => StrandConfig::load()?,
            },
        };

        if self.logging {
            logging::init_from_config(&config.logging);
        }

        let registry = self
            .registry
            .with_module_configs(config.modules)
            .build()?;
        info!(chains = registry.chain_count(), "Strand runtime started");
        Ok(StrandRuntime {
            registry: Arc::new(registry),
        })
    }
}

impl Default for StrandRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use strand_core::error::BoxError;
    use strand_core::foundation::MetaData;
    use strand_core::metadata_key;
    use strand_core::pipeline::{Action, ChainName, SplitConsumer};
    use strand_framework::{BuildError, ChainExtender, InitContext};

    metadata_key!(PREFIX: String);
    metadata_key!(RESPONSE: String);

    const ECHO: ChainName = ChainName::new("ECHO");

    struct EchoModule;

    impl Module for EchoModule {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn init(&mut self, context: &mut InitContext<'_>) -> Result<(), BuildError> {
            #[derive(serde::Deserialize)]
            struct EchoConfig {
                #[serde(default)]
                prefix: String,
            }
            let config: EchoConfig = context.config()?;
            context.add_metadatum(PREFIX, config.prefix);
            Ok(())
        }

        fn register(&mut self, extender: &mut ChainExtender<'_>) -> Result<(), BuildError> {
            let prefix = extender.get_metadatum(PREFIX)?.clone();
            extender.create_chain(ECHO, Action::Consume, Action::Consume)?;
            extender.append_processor(ECHO, move |metadata: &mut MetaData| -> Result<(), BoxError> {
                metadata.set(RESPONSE, format!("{prefix}pong"));
                Ok(())
            })
        }
    }

    #[test]
    fn test_runtime_builds_and_serves() {
        let mut config = StrandConfig::default();
        config
            .modules
            .insert("echo".to_string(), serde_json::json!({ "prefix": "> " }));

        let runtime = StrandRuntime::builder()
            .disable_logging()
            .with_config(config)
            .with_module(EchoModule)
            .start()
            .unwrap();

        let responses = Arc::new(AtomicUsize::new(0));
        let responses_clone = Arc::clone(&responses);
        runtime
            .registry()
            .put_into_chain(
                ECHO,
                MetaData::new(),
                SplitConsumer::new(
                    move |metadata: MetaData| {
                        assert_eq!(metadata.get(RESPONSE).unwrap(), "> pong");
                        responses_clone.fetch_add(1, Ordering::SeqCst);
                    },
                    |_| panic!("must not reach the failure path"),
                ),
            )
            .unwrap();
        assert_eq!(responses.load(Ordering::SeqCst), 1);

        runtime.shutdown();
    }
}
