//! The atomic unit of work in a chain.

use crate::error::BoxError;
use crate::foundation::MetaData;

/// One processing step inside a chain.
///
/// A processor communicates exclusively by mutating context slots; it has no
/// return value of its own. Returning an error (or panicking) redirects the
/// run into the owning chain's exception path — it never aborts the pipeline.
///
/// Closures of the matching shape implement `Processor` directly:
///
/// ```rust
/// use strand_core::error::BoxError;
/// use strand_core::foundation::MetaData;
/// use strand_core::metadata_key;
/// use strand_core::pipeline::Processor;
///
/// metadata_key!(STATUS: u16);
///
/// let set_status = |metadata: &mut MetaData| -> Result<(), BoxError> {
///     metadata.set(STATUS, 200);
///     Ok(())
/// };
/// # fn takes(_: impl Processor) {}
/// # takes(set_status);
/// ```
pub trait Processor: Send + Sync {
    /// Applies this step to the context.
    fn apply(&self, metadata: &mut MetaData) -> Result<(), BoxError>;
}

impl<F> Processor for F
where
    F: Fn(&mut MetaData) -> Result<(), BoxError> + Send + Sync,
{
    fn apply(&self, metadata: &mut MetaData) -> Result<(), BoxError> {
        self(metadata)
    }
}

/// A boxed, type-erased processor.
pub type BoxedProcessor = Box<dyn Processor>;
