//! Predicate-keyed lookup with an optional fallback.

use crate::error::FilterMapError;

type Predicate<K> = Box<dyn Fn(&K) -> bool + Send + Sync>;

/// An ordered map from predicates over `K` to values of `V`.
///
/// [`get`](FilterMap::get) returns the value of the first predicate, in
/// insertion order, that accepts the key, falling back to the default value
/// when none does. The primary use is mapping recorded failures to response
/// representations, with the default covering everything no specific entry
/// claims.
pub struct FilterMap<K: ?Sized, V> {
    entries: Vec<(Predicate<K>, V)>,
    default_value: Option<V>,
}

impl<K: ?Sized, V> FilterMap<K, V> {
    /// Creates an empty map with no default.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            default_value: None,
        }
    }

    /// Appends an entry; earlier entries take precedence.
    pub fn put(&mut self, filter: impl Fn(&K) -> bool + Send + Sync + 'static, value: V) {
        self.entries.push((Box::new(filter), value));
    }

    /// Sets the fallback value, replacing any previous one.
    pub fn set_default_value(&mut self, value: V) {
        self.default_value = Some(value);
    }

    /// Looks up the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterMapError::NoMatch`] when no predicate accepts the key
    /// and no default is set.
    pub fn get(&self, key: &K) -> Result<&V, FilterMapError> {
        self.entries
            .iter()
            .find(|(filter, _)| filter(key))
            .map(|(_, value)| value)
            .or(self.default_value.as_ref())
            .ok_or(FilterMapError::NoMatch)
    }

    /// Returns the number of non-default entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the map holds no entries and no default.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.default_value.is_none()
    }
}

impl<K: ?Sized, V> Default for FilterMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_accepting_entry_wins() {
        let mut map: FilterMap<str, u16> = FilterMap::new();
        map.put(|key| key.starts_with("not found"), 404);
        map.put(|key| key.contains("found"), 500);

        assert_eq!(map.get("not found: /missing"), Ok(&404));
        assert_eq!(map.get("profound failure"), Ok(&500));
    }

    #[test]
    fn test_default_covers_everything_else() {
        let mut map: FilterMap<str, u16> = FilterMap::new();
        map.put(|key| key == "timeout", 504);
        map.set_default_value(500);

        assert_eq!(map.get("timeout"), Ok(&504));
        assert_eq!(map.get("anything else"), Ok(&500));
    }

    #[test]
    fn test_missing_entry_without_default_is_an_error() {
        let map: FilterMap<str, u16> = FilterMap::new();
        assert_eq!(map.get("anything"), Err(FilterMapError::NoMatch));
    }
}
