//! Foundation layer: the typed context and its keys.

mod metadata;

pub use metadata::{MetaData, MetaDataKey};
