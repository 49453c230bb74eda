use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};

use crate::{OutputError, Value};

/// A mapping whose key set is fixed at construction.
///
/// The sanitizer stores its cleaned output in a `RestrictedMap` scoped to the
/// schema's output keys. Reading or writing any other key is a programming
/// error and returns [`OutputError::KeyNotAllowed`]; reading a declared key
/// that was never written returns `Ok(None)`.
///
/// Once [`freeze`](Self::freeze)d, writes fail with [`OutputError::Frozen`];
/// reads stay legal.
///
/// # Examples
///
/// ```
/// use input_sanitizer::{OutputError, RestrictedMap, Value};
///
/// let mut map = RestrictedMap::new(["a", "b"]);
///
/// assert_eq!(map.get("a"), Ok(None));
/// map.insert("a", Value::from("stuff")).unwrap();
/// assert_eq!(map.get("a"), Ok(Some(&Value::from("stuff"))));
///
/// assert!(matches!(map.get("c"), Err(OutputError::KeyNotAllowed { .. })));
///
/// map.freeze();
/// assert!(matches!(map.insert("b", Value::Null), Err(OutputError::Frozen { .. })));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RestrictedMap {
    allowed: BTreeSet<String>,
    entries: BTreeMap<String, Value>,
    frozen: bool,
}

impl RestrictedMap {
    /// Creates an empty, writable map that accepts exactly `keys`.
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            allowed: keys.into_iter().map(Into::into).collect(),
            entries: BTreeMap::new(),
            frozen: false,
        }
    }

    /// Reads a declared key.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::KeyNotAllowed`] if `key` is not declared.
    pub fn get(&self, key: &str) -> Result<Option<&Value>, OutputError> {
        self.check_allowed(key)?;
        Ok(self.entries.get(key))
    }

    /// Writes a declared key, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::KeyNotAllowed`] for undeclared keys and
    /// [`OutputError::Frozen`] once the map is frozen.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: Value,
    ) -> Result<Option<Value>, OutputError> {
        let key = key.into();
        self.check_allowed(&key)?;
        if self.frozen {
            return Err(OutputError::Frozen { key });
        }
        Ok(self.entries.insert(key, value))
    }

    /// Returns `true` if a value was written under `key`.
    ///
    /// Unlike [`get`](Self::get) this never fails: undeclared keys are simply absent.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns `true` if `key` belongs to the declared key set.
    pub fn allows(&self, key: &str) -> bool {
        self.allowed.contains(key)
    }

    /// Iterates the declared key set in sorted order.
    pub fn allowed_keys(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }

    /// Iterates the written entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of written entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Makes the map read-only. Idempotent.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Returns `true` once [`freeze`](Self::freeze) has been called.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Consumes the map, returning its written entries as a [`Value::Map`].
    pub fn into_value(self) -> Value {
        Value::Map(self.entries)
    }

    fn check_allowed(&self, key: &str) -> Result<(), OutputError> {
        if self.allowed.contains(key) {
            Ok(())
        } else {
            Err(OutputError::KeyNotAllowed {
                key: key.to_string(),
            })
        }
    }
}

/// Serializes the written entries only, as a plain object.
impl Serialize for RestrictedMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> RestrictedMap {
        RestrictedMap::new(["a", "b"])
    }

    #[test]
    fn rejects_undeclared_keys() {
        let mut map = map();

        assert_eq!(
            map.get("c"),
            Err(OutputError::KeyNotAllowed {
                key: "c".to_string()
            })
        );
        assert!(map.insert("c", Value::Integer(1)).is_err());
        assert!(map.is_empty());
    }

    #[test]
    fn declared_but_unset_key_reads_as_none() {
        assert_eq!(map().get("a"), Ok(None));
    }

    #[test]
    fn returns_written_value() {
        let mut map = map();
        map.insert("a", Value::from("stuff")).unwrap();

        assert_eq!(map.get("a"), Ok(Some(&Value::from("stuff"))));
        assert!(map.contains_key("a"));
        assert!(!map.contains_key("b"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn insert_returns_previous_value() {
        let mut map = map();
        map.insert("a", Value::Integer(1)).unwrap();

        let previous = map.insert("a", Value::Integer(2)).unwrap();
        assert_eq!(previous, Some(Value::Integer(1)));
    }

    #[test]
    fn frozen_map_is_read_only() {
        let mut map = map();
        map.insert("a", Value::Integer(1)).unwrap();
        map.freeze();

        assert!(map.is_frozen());
        assert_eq!(
            map.insert("b", Value::Integer(2)),
            Err(OutputError::Frozen {
                key: "b".to_string()
            })
        );
        assert_eq!(map.get("a"), Ok(Some(&Value::Integer(1))));
    }

    #[test]
    fn undeclared_key_wins_over_frozen() {
        let mut map = map();
        map.freeze();

        assert!(matches!(
            map.insert("zzz", Value::Null),
            Err(OutputError::KeyNotAllowed { .. })
        ));
    }

    #[test]
    fn serializes_written_entries_only() {
        let mut map = map();
        map.insert("b", Value::Bool(true)).unwrap();

        assert_eq!(
            serde_json::to_value(&map).unwrap(),
            serde_json::json!({ "b": true })
        );
    }

    #[test]
    fn into_value_yields_map() {
        let mut map = map();
        map.insert("a", Value::Integer(5)).unwrap();

        let expected: Value = [("a", 5)].into_iter().collect();
        assert_eq!(map.into_value(), expected);
    }
}
