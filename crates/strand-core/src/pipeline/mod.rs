//! The chain pipeline: processors, chains, and the execution registry.

mod chain;
mod consumer;
mod processor;
mod registry;

pub use chain::{Action, Chain, ChainName, JumpRule};
pub use consumer::{ChainConsumer, DiscardingConsumer, SplitConsumer};
pub use processor::{BoxedProcessor, Processor};
pub use registry::{ChainRegistry, EXCEPTION};
