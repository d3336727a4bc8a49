//! Condition-guarded value registries.

use tracing::{Level, span, trace};

use std::collections::HashMap;

use crate::error::RoutingError;
use crate::foundation::MetaData;
use crate::metadata_key;
use crate::routing::condition::GenerationCondition;

metadata_key!(
    /// Path parameters captured by the condition that selected the current
    /// handler, e.g. `id` for a template `/items/<id>`.
    pub CAPTURED_PARAMETERS: HashMap<String, String>
);

/// One registered value together with the condition that selects it.
struct Generator<T> {
    condition: Box<dyn GenerationCondition>,
    value: T,
}

/// An ordered registry of values selected by [`GenerationCondition`]s.
///
/// Registration order is significant: [`generate`](Generators::generate)
/// returns the value of the *first* matching condition. Registrations whose
/// condition structurally overlaps an earlier one of the same concrete type
/// are rejected, since the later entry could never be selected for the
/// contexts they share.
pub struct Generators<T> {
    generators: Vec<Generator<T>>,
}

impl<T> Generators<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            generators: Vec::new(),
        }
    }

    /// Registers `value` under `condition`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::OverlappingConditions`] when the condition
    /// structurally overlaps one that is already registered.
    pub fn register(
        &mut self,
        condition: impl GenerationCondition + 'static,
        value: T,
    ) -> Result<(), RoutingError> {
        for existing in &self.generators {
            if existing.condition.overlaps(&condition) || condition.overlaps(&*existing.condition) {
                return Err(RoutingError::OverlappingConditions {
                    existing: existing.condition.describe(),
                    added: condition.describe(),
                });
            }
        }
        self.generators.push(Generator {
            condition: Box::new(condition),
            value,
        });
        Ok(())
    }

    /// Selects the value for the given context.
    ///
    /// On a match, the condition's captured parameters are written to the
    /// [`CAPTURED_PARAMETERS`] slot before the value is returned.
    pub fn generate(&self, metadata: &mut MetaData) -> Option<&T> {
        let span = span!(Level::TRACE, "generate");
        let _enter = span.enter();

        for generator in &self.generators {
            if generator.condition.matches(metadata) {
                trace!(condition = %generator.condition.describe(), "condition matched");
                metadata.set(CAPTURED_PARAMETERS, generator.condition.extract_parameters(metadata));
                return Some(&generator.value);
            }
        }
        trace!("no condition matched");
        None
    }

    /// Returns the number of registered values.
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl<T> Default for Generators<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::condition::ContextCondition;
    use crate::routing::template::PathTemplate;

    metadata_key!(METHOD: String);
    metadata_key!(PATH: String);

    fn context(method: &str, path: &str) -> MetaData {
        let mut metadata = MetaData::new();
        metadata.set(METHOD, method.to_string());
        metadata.set(PATH, path.to_string());
        metadata
    }

    #[test]
    fn test_first_matching_condition_wins() {
        let mut generators = Generators::new();
        generators
            .register(ContextCondition::new().require(METHOD, "GET"), "get")
            .unwrap();
        generators
            .register(ContextCondition::new().require(METHOD, "POST"), "post")
            .unwrap();

        let mut metadata = context("POST", "/items");
        assert_eq!(generators.generate(&mut metadata), Some(&"post"));

        let mut metadata = context("PUT", "/items");
        assert_eq!(generators.generate(&mut metadata), None);
    }

    #[test]
    fn test_captured_parameters_are_published() {
        let mut generators = Generators::new();
        generators
            .register(
                ContextCondition::new()
                    .require(METHOD, "GET")
                    .with_template(PATH, PathTemplate::parse("/items/<id>")),
                "show item",
            )
            .unwrap();

        let mut metadata = context("GET", "/items/42");
        assert_eq!(generators.generate(&mut metadata), Some(&"show item"));
        let captured = metadata.get(CAPTURED_PARAMETERS).unwrap();
        assert_eq!(captured["id"], "42");
    }

    #[test]
    fn test_overlapping_registration_is_rejected() {
        let mut generators = Generators::new();
        generators
            .register(
                ContextCondition::new()
                    .require(METHOD, "GET")
                    .with_template(PATH, PathTemplate::parse("/items/<id>")),
                "by id",
            )
            .unwrap();

        let error = generators
            .register(
                ContextCondition::new()
                    .require(METHOD, "GET")
                    .with_template(PATH, PathTemplate::parse("/items/<name>")),
                "by name",
            )
            .unwrap_err();
        assert!(matches!(error, RoutingError::OverlappingConditions { .. }));
        assert!(error.to_string().contains("would therefore never trigger"));
        assert_eq!(generators.len(), 1);
    }

    #[test]
    fn test_disjoint_conditions_register_cleanly() {
        let mut generators = Generators::new();
        generators
            .register(ContextCondition::new().require(METHOD, "GET"), 1)
            .unwrap();
        generators
            .register(ContextCondition::new().require(METHOD, "POST"), 2)
            .unwrap();
        assert_eq!(generators.len(), 2);
    }
}
