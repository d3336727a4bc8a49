//! Typed per-run context for the Strand pipeline engine.
//!
//! This module provides [`MetaData`], the heterogeneous property bag that is
//! threaded through one pipeline run, and [`MetaDataKey`], the compile-time
//! checked token used to address its slots.
//!
//! # Keys
//!
//! A [`MetaDataKey<T>`] ties a slot name to a value type `T`. Keys are
//! declared once, as constants, and shared between the code that writes a
//! slot and the code that reads it:
//!
//! ```rust
//! use strand_core::metadata_key;
//!
//! metadata_key!(pub STATUS: u16);
//! metadata_key!(pub PATH: String);
//! ```
//!
//! Identity is the key's name; two keys with the same name address the same
//! slot, and there is no implicit coercion between keys of different names.
//!
//! # Lifecycle
//!
//! A `MetaData` is created empty for each inbound request or message, mutated
//! in place by processors during the run, and handed to the terminal consumer
//! when the run ends. It is never shared between concurrent runs, so no
//! synchronization is involved. The one exception is the process-wide
//! configuration `MetaData` assembled at build time, which is frozen inside
//! the registry and only read afterwards.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use crate::error::MetaDataError;

/// A typed token addressing one [`MetaData`] slot.
///
/// Keys are cheap to copy and can be declared in `const` position, which is
/// what the [`metadata_key!`](crate::metadata_key) macro does.
pub struct MetaDataKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MetaDataKey<T> {
    /// Creates a key with the given name.
    ///
    /// Prefer [`metadata_key!`](crate::metadata_key), which derives the name
    /// from the constant's identifier so the two cannot drift apart.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Returns the slot name this key addresses.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for MetaDataKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MetaDataKey<T> {}

impl<T> PartialEq for MetaDataKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for MetaDataKey<T> {}

impl<T> fmt::Debug for MetaDataKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MetaDataKey").field(&self.name).finish()
    }
}

impl<T> fmt::Display for MetaDataKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Declares a [`MetaDataKey`] constant whose slot name is the identifier.
///
/// # Example
///
/// ```rust
/// use strand_core::metadata_key;
///
/// metadata_key!(pub REQUEST_BODY: String);
/// metadata_key!(IS_WEBSOCKET: bool);
/// ```
#[macro_export]
macro_rules! metadata_key {
    ($(#[$attr:meta])* $vis:vis $name:ident: $ty:ty) => {
        $(#[$attr])*
        $vis const $name: $crate::foundation::MetaDataKey<$ty> =
            $crate::foundation::MetaDataKey::new(stringify!($name));
    };
}

/// The per-run context: a map from [`MetaDataKey`] to typed values.
///
/// Setting a key is an unconditional overwrite. Reading an absent key with
/// [`get`](Self::get) fails with [`MetaDataError::KeyNotFound`] — that is a
/// programming-error-class failure (a stage reading a slot before the stage
/// that sets it has run), distinct from the routed processor failures stored
/// in the `EXCEPTION` slot. Use [`get_optional`](Self::get_optional) for
/// slots that are legitimately absent.
#[derive(Default)]
pub struct MetaData {
    slots: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl MetaData {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set<T: Send + Sync + 'static>(&mut self, key: MetaDataKey<T>, value: T) {
        self.slots.insert(key.name, Box::new(value));
    }

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// [`MetaDataError::KeyNotFound`] if the slot was never set, or
    /// [`MetaDataError::TypeMismatch`] if a same-named key of a different
    /// value type was used to store it.
    pub fn get<T: Send + Sync + 'static>(&self, key: MetaDataKey<T>) -> Result<&T, MetaDataError> {
        let slot = self
            .slots
            .get(key.name)
            .ok_or(MetaDataError::KeyNotFound { key: key.name })?;
        slot.downcast_ref::<T>()
            .ok_or(MetaDataError::TypeMismatch {
                key: key.name,
                expected: std::any::type_name::<T>(),
            })
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut<T: Send + Sync + 'static>(
        &mut self,
        key: MetaDataKey<T>,
    ) -> Result<&mut T, MetaDataError> {
        let slot = self
            .slots
            .get_mut(key.name)
            .ok_or(MetaDataError::KeyNotFound { key: key.name })?;
        slot.downcast_mut::<T>().ok_or(MetaDataError::TypeMismatch {
            key: key.name,
            expected: std::any::type_name::<T>(),
        })
    }

    /// Returns the value stored under `key`, or `None` when absent.
    pub fn get_optional<T: Send + Sync + 'static>(&self, key: MetaDataKey<T>) -> Option<&T> {
        self.slots.get(key.name).and_then(|slot| slot.downcast_ref())
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove<T: Send + Sync + 'static>(&mut self, key: MetaDataKey<T>) -> Option<T> {
        match self.slots.remove(key.name)?.downcast::<T>() {
            Ok(value) => Some(*value),
            // A same-named key of a different type; treat as absent.
            Err(_) => None,
        }
    }

    /// Returns whether the slot addressed by `key` is set.
    pub fn contains<T>(&self, key: MetaDataKey<T>) -> bool {
        self.slots.contains_key(key.name)
    }

    /// Returns the number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for MetaData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&&'static str> = self.slots.keys().collect();
        names.sort_unstable();
        f.debug_struct("MetaData").field("slots", &names).finish()
    }
}
