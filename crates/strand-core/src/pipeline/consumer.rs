//! Terminal continuations for pipeline runs.

use crate::foundation::MetaData;

/// Receives the final context of one pipeline run.
///
/// Exactly one of the two methods is invoked per run: `on_failure` when the
/// [`EXCEPTION`](crate::pipeline::EXCEPTION) slot is set at the terminal
/// rule, `on_success` otherwise. The caller is responsible for extracting a
/// response representation from the context.
pub trait ChainConsumer {
    /// The run ended with no recorded failure.
    fn on_success(self, metadata: MetaData);

    /// The run ended with a failure recorded in the `EXCEPTION` slot.
    fn on_failure(self, metadata: MetaData);
}

/// Adapts a pair of closures into a [`ChainConsumer`].
pub struct SplitConsumer<S, F> {
    on_success: S,
    on_failure: F,
}

impl<S, F> SplitConsumer<S, F> {
    /// Creates a consumer from a success and a failure continuation.
    pub fn new(on_success: S, on_failure: F) -> Self {
        Self {
            on_success,
            on_failure,
        }
    }
}

impl<S, F> ChainConsumer for SplitConsumer<S, F>
where
    S: FnOnce(MetaData),
    F: FnOnce(MetaData),
{
    fn on_success(self, metadata: MetaData) {
        (self.on_success)(metadata)
    }

    fn on_failure(self, metadata: MetaData) {
        (self.on_failure)(metadata)
    }
}

/// A consumer that discards the context, for fire-and-forget runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardingConsumer;

impl ChainConsumer for DiscardingConsumer {
    fn on_success(self, _metadata: MetaData) {}

    fn on_failure(self, _metadata: MetaData) {}
}
