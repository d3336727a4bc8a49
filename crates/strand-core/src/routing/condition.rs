//! Conditions deciding which generator handles a given context.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::foundation::{MetaData, MetaDataKey};
use crate::routing::template::PathTemplate;

/// Decides whether a registered value applies to the current context, and
/// which path parameters it captures when it does.
///
/// Implementations must also be able to judge *structural* overlap with other
/// conditions of the same concrete type, so that a registry can reject
/// shadowed registrations at build time. Two conditions overlap when some
/// context could satisfy both. Conditions of different concrete types are
/// never considered overlapping; such a comparison is undecidable and the
/// later registration wins by order.
pub trait GenerationCondition: Send + Sync {
    /// Returns whether this condition holds for the context.
    fn matches(&self, metadata: &MetaData) -> bool;

    /// Returns the names of the parameters this condition may capture.
    fn parameter_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Extracts captured parameters from a matching context.
    ///
    /// Only called after [`matches`](Self::matches) returned `true`.
    fn extract_parameters(&self, _metadata: &MetaData) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Conservatively decides whether some context could match both
    /// conditions.
    fn overlaps(&self, other: &dyn GenerationCondition) -> bool;

    /// A human-readable rendering for diagnostics and error messages.
    fn describe(&self) -> String;

    /// Downcasting support for structural overlap checks.
    fn as_any(&self) -> &dyn Any;
}

/// A condition over string-valued context slots.
///
/// Every required `(slot, value)` pair must be present verbatim, and the
/// optional path template must match the designated slot's value. An empty
/// condition matches every context.
///
/// ```rust
/// use strand_core::metadata_key;
/// use strand_core::routing::{ContextCondition, GenerationCondition, PathTemplate};
/// use strand_core::foundation::MetaData;
///
/// metadata_key!(METHOD: String);
/// metadata_key!(PATH: String);
///
/// let condition = ContextCondition::new()
///     .require(METHOD, "GET")
///     .with_template(PATH, PathTemplate::parse("/items/<id>"));
///
/// let mut metadata = MetaData::new();
/// metadata.set(METHOD, "GET".to_string());
/// metadata.set(PATH, "/items/42".to_string());
/// assert!(condition.matches(&metadata));
/// assert_eq!(condition.extract_parameters(&metadata)["id"], "42");
/// ```
pub struct ContextCondition {
    required: Vec<(MetaDataKey<String>, String)>,
    template: Option<(MetaDataKey<String>, PathTemplate)>,
}

impl ContextCondition {
    /// Creates a condition that matches every context.
    pub fn new() -> Self {
        Self {
            required: Vec::new(),
            template: None,
        }
    }

    /// Requires `slot` to hold exactly `value`.
    pub fn require(mut self, slot: MetaDataKey<String>, value: impl Into<String>) -> Self {
        self.required.push((slot, value.into()));
        self
    }

    /// Requires `slot` to hold a path matching `template`; parameters are
    /// captured on match.
    pub fn with_template(mut self, slot: MetaDataKey<String>, template: PathTemplate) -> Self {
        self.template = Some((slot, template));
        self
    }
}

impl Default for ContextCondition {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationCondition for ContextCondition {
    fn matches(&self, metadata: &MetaData) -> bool {
        let required = self.required.iter().all(|(slot, expected)| {
            metadata
                .get_optional(*slot)
                .is_some_and(|actual| actual == expected)
        });
        if !required {
            return false;
        }
        match &self.template {
            Some((slot, template)) => metadata
                .get_optional(*slot)
                .is_some_and(|path| template.matches(path).is_some()),
            None => true,
        }
    }

    fn parameter_names(&self) -> Vec<String> {
        match &self.template {
            Some((_, template)) => template.parameter_names(),
            None => Vec::new(),
        }
    }

    fn extract_parameters(&self, metadata: &MetaData) -> HashMap<String, String> {
        match &self.template {
            Some((slot, template)) => metadata
                .get_optional(*slot)
                .and_then(|path| template.matches(path))
                .unwrap_or_default(),
            None => HashMap::new(),
        }
    }

    fn overlaps(&self, other: &dyn GenerationCondition) -> bool {
        let Some(other) = other.as_any().downcast_ref::<ContextCondition>() else {
            return false;
        };

        // A shared required slot pinned to different values makes the
        // conditions disjoint.
        for (slot, value) in &self.required {
            for (other_slot, other_value) in &other.required {
                if slot == other_slot && value != other_value {
                    return false;
                }
            }
        }

        // Templates on the same slot must themselves overlap; templates on
        // different slots constrain independent values and cannot rule each
        // other out.
        match (&self.template, &other.template) {
            (Some((slot, template)), Some((other_slot, other_template))) if slot == other_slot => {
                template.overlaps(other_template)
            }
            _ => true,
        }
    }

    fn describe(&self) -> String {
        let mut parts: Vec<String> = self
            .required
            .iter()
            .map(|(slot, value)| format!("{slot} = {value:?}"))
            .collect();
        if let Some((slot, template)) = &self.template {
            parts.push(format!("{slot} matches {template}"));
        }
        if parts.is_empty() {
            "any context".to_string()
        } else {
            parts.join(" and ")
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for ContextCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextCondition({})", self.describe())
    }
}
