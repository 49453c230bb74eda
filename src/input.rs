use std::collections::{BTreeMap, HashMap};

use crate::Value;

/// A raw input snapshot with normalized keys.
///
/// Any string-like key type is normalized to an owned `String`, so `&str`,
/// `String` and JSON object keys all address the same field. When two input
/// keys normalize to the same key, the last one written wins.
///
/// Input that is not a map (a JSON array, a bare string, ...) carries no
/// fields at all.
///
/// # Examples
///
/// ```
/// use input_sanitizer::{RawInput, Value};
/// use serde_json::json;
///
/// let from_json = RawInput::from(json!({ "x": "ddd", "d": 3 }));
/// let from_pairs = RawInput::from([("x", "ddd")]);
///
/// assert_eq!(from_json.get("x"), from_pairs.get("x"));
/// assert_eq!(from_json.get("d"), Some(&Value::Integer(3)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInput {
    entries: BTreeMap<String, Value>,
}

impl RawInput {
    /// Creates an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<Value>) {
        self.entries.insert(normalize_key(key), value.into());
    }

    /// Looks up an entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns `true` if the input has an entry for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_key(key: impl AsRef<str>) -> String {
    key.as_ref().to_owned()
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for RawInput {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut input = RawInput::new();
        for (key, value) in iter {
            input.insert(key, value);
        }
        input
    }
}

impl<K: AsRef<str>, V: Into<Value>, const N: usize> From<[(K, V); N]> for RawInput {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: AsRef<str>, V: Into<Value>> From<HashMap<K, V>> for RawInput {
    fn from(map: HashMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl From<BTreeMap<String, Value>> for RawInput {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self { entries }
    }
}

impl From<Value> for RawInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Map(entries) => Self { entries },
            _ => Self::default(),
        }
    }
}

impl From<serde_json::Value> for RawInput {
    fn from(json: serde_json::Value) -> Self {
        RawInput::from(Value::from(json))
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for RawInput {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_and_str_keys_address_the_same_field() {
        let mut input = RawInput::new();
        input.insert("x", 1);
        input.insert(String::from("x"), 2);

        assert_eq!(input.len(), 1);
        assert_eq!(input.get("x"), Some(&Value::Integer(2)));
    }

    #[test]
    fn last_write_wins_on_collision() {
        let input: RawInput = vec![("a", "first"), ("a", "second")].into_iter().collect();

        assert_eq!(input.get("a"), Some(&Value::from("second")));
    }

    #[test]
    fn non_object_json_carries_no_fields() {
        assert!(RawInput::from(json!([1, 2, 3])).is_empty());
        assert!(RawInput::from(json!("x")).is_empty());
        assert!(RawInput::from(json!(null)).is_empty());
    }

    #[test]
    fn hash_map_input_is_accepted() {
        let mut map = HashMap::new();
        map.insert("num", "3");

        let input = RawInput::from(map);
        assert!(input.contains_key("num"));
        assert!(!input.contains_key("other"));
    }

    #[test]
    fn json_map_input_is_accepted() {
        let json = json!({ "nested": { "foo": 1 } });
        let serde_json::Value::Object(map) = json else {
            unreachable!()
        };

        let input = RawInput::from(map);
        let nested = input.get("nested").and_then(Value::as_map).unwrap();
        assert_eq!(nested["foo"], Value::Integer(1));
    }
}
