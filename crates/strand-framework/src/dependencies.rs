//! Shared services exchanged between modules during the build.

use tracing::trace;

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A type-keyed registry of shared services.
///
/// Modules provide services in their `configure` phase and look up services
/// other modules provided. The registry is keyed by concrete type; providing
/// a second service of the same type replaces the first.
pub struct DependencyRegistry {
    services: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl DependencyRegistry {
    pub(crate) fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Registers a shared service under its concrete type.
    pub fn provide<T: Send + Sync + 'static>(&mut self, service: Arc<T>) {
        trace!(service = type_name::<T>(), "Service provided");
        self.services.insert(TypeId::of::<T>(), service);
    }

    /// Looks up a shared service by type.
    pub fn lookup<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|service| service.downcast::<T>().ok())
    }

    /// Returns the number of provided services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns whether no service was provided.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for DependencyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyRegistry")
            .field("services", &self.services.len())
            .finish()
    }
}
