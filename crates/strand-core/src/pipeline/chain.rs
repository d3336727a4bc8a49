//! Chains: named, ordered processor sequences with terminal rules.
//!
//! A [`Chain`] bundles an ordered list of [`Processor`]s with the two
//! [`Action`]s fixed at creation time — what to do when every processor
//! succeeded ([`on_success`](Chain::on_success)) and what to do when one of
//! them failed ([`on_exception`](Chain::on_exception)) — plus any number of
//! conditional [`JumpRule`]s evaluated between the processors and the default
//! success action.
//!
//! Chains are created exactly once, by their owning module, and are frozen
//! when the registry is built; other modules may only append processors and
//! jump rules during the build.

use std::fmt;

use crate::foundation::{MetaData, MetaDataKey};
use crate::pipeline::processor::{BoxedProcessor, Processor};

/// The identity of one chain.
///
/// Chain names are compile-time tokens, declared as constants next to the
/// module that owns the chain:
///
/// ```rust
/// use strand_core::pipeline::ChainName;
///
/// pub const PROCESS_BODY: ChainName = ChainName::new("PROCESS_BODY");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainName(&'static str);

impl ChainName {
    /// Creates a chain name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Debug for ChainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChainName").field(&self.0).finish()
    }
}

impl fmt::Display for ChainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// What happens at a chain boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Transfer control to another chain and keep executing.
    Jump(ChainName),
    /// End the run and hand the context to the caller's consumer.
    Consume,
    /// End the run on a fire-and-forget path; no response is expected from
    /// the context, but the consumer is still notified.
    Drop,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jump(target) => write!(f, "jump {target}"),
            Self::Consume => f.write_str("consume"),
            Self::Drop => f.write_str("drop"),
        }
    }
}

/// A conditional jump evaluated after a chain's processors succeed.
///
/// Rules are checked in registration order; the first whose condition holds
/// redirects the run to its target, otherwise the chain's default success
/// action applies.
pub struct JumpRule {
    description: String,
    condition: Box<dyn Fn(&MetaData) -> bool + Send + Sync>,
    target: ChainName,
}

impl JumpRule {
    /// Creates a jump rule from an arbitrary condition.
    ///
    /// The description is only used in diagnostics such as
    /// [`ChainRegistry::dump`](crate::pipeline::ChainRegistry::dump).
    pub fn new(
        description: impl Into<String>,
        target: ChainName,
        condition: impl Fn(&MetaData) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            condition: Box::new(condition),
            target,
        }
    }

    /// A rule that jumps when the given slot is set.
    pub fn if_set<T: 'static>(key: MetaDataKey<T>, target: ChainName) -> Self {
        Self::new(format!("{key} is set"), target, move |metadata| {
            metadata.contains(key)
        })
    }

    /// A rule that jumps when the given boolean slot is set to `true`.
    pub fn if_flag_is_set(key: MetaDataKey<bool>, target: ChainName) -> Self {
        Self::new(format!("{key} flag is set"), target, move |metadata| {
            metadata.get_optional(key).copied().unwrap_or(false)
        })
    }

    /// Returns the human-readable condition description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the jump target.
    pub fn target(&self) -> ChainName {
        self.target
    }

    pub(crate) fn matches(&self, metadata: &MetaData) -> bool {
        (self.condition)(metadata)
    }
}

impl fmt::Debug for JumpRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JumpRule")
            .field("description", &self.description)
            .field("target", &self.target)
            .finish()
    }
}

/// A named, ordered sequence of processors plus its terminal behaviour.
pub struct Chain {
    name: ChainName,
    processors: Vec<BoxedProcessor>,
    jump_rules: Vec<JumpRule>,
    on_success: Action,
    on_exception: Action,
}

impl Chain {
    /// Creates an empty chain with its terminal actions.
    ///
    /// `on_exception` is followed whenever a processor inside this chain
    /// fails; typically it jumps to a chain that maps the recorded error to
    /// a response.
    pub fn new(name: ChainName, on_success: Action, on_exception: Action) -> Self {
        Self {
            name,
            processors: Vec::new(),
            jump_rules: Vec::new(),
            on_success,
            on_exception,
        }
    }

    /// Appends a processor; processors run in append order.
    pub fn append_processor(&mut self, processor: impl Processor + 'static) {
        self.processors.push(Box::new(processor));
    }

    /// Appends a conditional jump rule.
    pub fn add_jump_rule(&mut self, rule: JumpRule) {
        self.jump_rules.push(rule);
    }

    /// Returns this chain's name.
    pub fn name(&self) -> ChainName {
        self.name
    }

    /// Returns the number of processors.
    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    /// Returns the default action taken after all processors succeed.
    pub fn on_success(&self) -> Action {
        self.on_success
    }

    /// Returns the action taken when a processor fails.
    pub fn on_exception(&self) -> Action {
        self.on_exception
    }

    /// Returns the registered jump rules in evaluation order.
    pub fn jump_rules(&self) -> &[JumpRule] {
        &self.jump_rules
    }

    pub(crate) fn processors(&self) -> &[BoxedProcessor] {
        &self.processors
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("name", &self.name)
            .field("processors", &self.processors.len())
            .field("jump_rules", &self.jump_rules)
            .field("on_success", &self.on_success)
            .field("on_exception", &self.on_exception)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata_key;

    metadata_key!(RESPONSE: String);
    metadata_key!(IS_AUTHENTICATED: bool);

    const NEXT: ChainName = ChainName::new("NEXT");

    #[test]
    fn test_if_set_rule_matches_only_when_slot_is_present() {
        let rule = JumpRule::if_set(RESPONSE, NEXT);
        let mut metadata = MetaData::new();

        assert!(!rule.matches(&metadata));
        metadata.set(RESPONSE, "ok".to_string());
        assert!(rule.matches(&metadata));
        assert_eq!(rule.target(), NEXT);
    }

    #[test]
    fn test_flag_rule_requires_true() {
        let rule = JumpRule::if_flag_is_set(IS_AUTHENTICATED, NEXT);
        let mut metadata = MetaData::new();

        assert!(!rule.matches(&metadata));
        metadata.set(IS_AUTHENTICATED, false);
        assert!(!rule.matches(&metadata));
        metadata.set(IS_AUTHENTICATED, true);
        assert!(rule.matches(&metadata));
    }
}
