//! Handler distribution: normalizing arbitrary handler shapes.
//!
//! Adapters accept handlers in many shapes — plain functions, trait objects,
//! framework-specific wrappers. Distribution repeatedly rewrites a handler
//! through registered transforms until a registration consumes it, so that
//! downstream code only ever deals with the shapes it registered for.

use tracing::{Level, span, trace};

use std::any::{Any, type_name};
use std::collections::VecDeque;
use std::fmt;

use crate::error::{BoxError, DistributionError};
use crate::foundation::MetaData;

/// Distribution aborts after this many rewrites of a single handler, which
/// would otherwise loop forever on a cyclic transform set.
pub const MAX_DISTRIBUTION_HOPS: usize = 64;

/// A type-erased handler travelling through distribution.
pub struct HandlerEnvelope {
    handler: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl HandlerEnvelope {
    /// Wraps a handler, recording its type name for diagnostics.
    pub fn new<T: Any + Send + Sync>(handler: T) -> Self {
        Self {
            handler: Box::new(handler),
            type_name: type_name::<T>(),
        }
    }

    /// Returns whether the wrapped handler is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.handler.is::<T>()
    }

    /// Borrows the wrapped handler as a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.handler.downcast_ref::<T>()
    }

    /// Unwraps the handler as a `T`, or returns the envelope unchanged.
    pub fn downcast<T: Any>(self) -> Result<Box<T>, HandlerEnvelope> {
        let type_name = self.type_name;
        self.handler.downcast::<T>().map_err(|handler| Self {
            handler,
            type_name,
        })
    }

    /// Returns the type name recorded at wrap time.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for HandlerEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEnvelope")
            .field("type_name", &self.type_name)
            .finish()
    }
}

type Predicate = Box<dyn Fn(&HandlerEnvelope) -> bool + Send + Sync>;
type Transform =
    Box<dyn Fn(HandlerEnvelope, &mut MetaData) -> Result<Vec<HandlerEnvelope>, BoxError> + Send + Sync>;

/// An ordered registry of handler transforms.
///
/// Each registration pairs a predicate with a transform. Distributing a
/// handler hands it to the first registration whose predicate accepts it; the
/// transform either consumes the handler (typically wiring it into a chain
/// and returning no follow-ups) or rewrites it into simpler handlers that are
/// distributed in turn.
pub struct HandlerDistributors {
    entries: Vec<(Predicate, Transform)>,
}

impl HandlerDistributors {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a transform guarded by an arbitrary predicate.
    ///
    /// Earlier registrations take precedence.
    pub fn register(
        &mut self,
        predicate: impl Fn(&HandlerEnvelope) -> bool + Send + Sync + 'static,
        transform: impl Fn(HandlerEnvelope, &mut MetaData) -> Result<Vec<HandlerEnvelope>, BoxError>
        + Send
        + Sync
        + 'static,
    ) {
        self.entries.push((Box::new(predicate), Box::new(transform)));
    }

    /// Registers a transform for handlers of the concrete type `T`.
    pub fn register_for<T: Any>(
        &mut self,
        transform: impl Fn(HandlerEnvelope, &mut MetaData) -> Result<Vec<HandlerEnvelope>, BoxError>
        + Send
        + Sync
        + 'static,
    ) {
        self.register(|envelope| envelope.is::<T>(), transform);
    }

    /// Distributes a handler until every resulting envelope is consumed.
    ///
    /// # Errors
    ///
    /// - [`DistributionError::UnrecognizedHandler`] when no registration
    ///   accepts an envelope,
    /// - [`DistributionError::HopLimitExceeded`] after
    ///   [`MAX_DISTRIBUTION_HOPS`] rewrites, which indicates a transform
    ///   cycle,
    /// - [`DistributionError::TransformFailed`] when a transform reports an
    ///   error of its own.
    pub fn distribute(
        &self,
        handler: HandlerEnvelope,
        metadata: &mut MetaData,
    ) -> Result<(), DistributionError> {
        let span = span!(Level::TRACE, "distribute", handler = handler.type_name());
        let _enter = span.enter();

        let mut worklist = VecDeque::from([handler]);
        let mut hops = 0usize;

        while let Some(envelope) = worklist.pop_front() {
            if hops >= MAX_DISTRIBUTION_HOPS {
                return Err(DistributionError::HopLimitExceeded {
                    max_hops: MAX_DISTRIBUTION_HOPS,
                    type_name: envelope.type_name(),
                });
            }
            hops += 1;

            let type_name = envelope.type_name();
            let entry = self
                .entries
                .iter()
                .find(|(predicate, _)| predicate(&envelope));
            match entry {
                Some((_, transform)) => {
                    let followups = transform(envelope, metadata).map_err(|source| {
                        DistributionError::TransformFailed { type_name, source }
                    })?;
                    trace!(handler = type_name, followups = followups.len(), "transformed");
                    worklist.extend(followups);
                }
                None => {
                    return Err(DistributionError::UnrecognizedHandler { type_name });
                }
            }
        }
        Ok(())
    }

    /// Returns the number of registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no transform is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HandlerDistributors {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlerDistributors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDistributors")
            .field("entries", &self.entries.len())
            .finish()
    }
}
