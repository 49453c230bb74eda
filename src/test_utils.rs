//! Shared proptest strategies for unit tests.

use std::collections::BTreeMap;

use proptest::prelude::*;

use crate::Value;

/// Field-like identifiers: lowercase ASCII and underscores.
pub(crate) fn arb_field_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z_]{0,8}").unwrap()
}

/// Scalar raw values of every shape request parameters usually take.
pub(crate) fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        any::<i64>().prop_map(|n| Value::String(n.to_string())),
        prop::string::string_regex("[ -~]{0,12}")
            .unwrap()
            .prop_map(Value::String),
    ]
}

/// Raw input maps with arbitrary keys and scalar values.
pub(crate) fn arb_raw_map() -> impl Strategy<Value = BTreeMap<String, Value>> {
    prop::collection::btree_map(arb_field_name(), arb_scalar(), 0..8)
}
