//! Selecting handlers and values from the context.
//!
//! Routing is split into three independent pieces:
//!
//! - [`PathTemplate`] — path patterns with named captures,
//! - [`GenerationCondition`] / [`ContextCondition`] — predicates over the
//!   context deciding whether a registration applies,
//! - [`Generators`] — an ordered registry returning the first value whose
//!   condition matches, rejecting structurally shadowed registrations,
//! - [`FilterMap`] — predicate-keyed lookup with a fallback, used to map
//!   failures to responses.

mod condition;
mod filter_map;
mod generators;
mod template;

pub use condition::{ContextCondition, GenerationCondition};
pub use filter_map::FilterMap;
pub use generators::{CAPTURED_PARAMETERS, Generators};
pub use template::PathTemplate;
