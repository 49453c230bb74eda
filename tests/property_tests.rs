//! Integration property tests for input-sanitizer.
//!
//! These tests validate cross-module invariants of a full sanitization pass
//! using property-based testing.

use std::collections::BTreeMap;

use input_sanitizer::{FieldErrorKind, FieldOptions, RawInput, Schema, SchemaBuilder, Value};
use proptest::prelude::*;

fn schema() -> Schema {
    Schema::builder("PropertySanitizer")
        .string(["name", "title"], FieldOptions::new())
        .integer(["age"], FieldOptions::new())
        .integer(["count"], FieldOptions::new().required(true))
        .boolean(["active"], FieldOptions::new())
        .build()
}

// Strategy: keys drawn from declared and undeclared names
fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("name".to_string()),
        Just("title".to_string()),
        Just("age".to_string()),
        Just("count".to_string()),
        Just("active".to_string()),
        prop::string::string_regex("[a-z]{1,6}").unwrap(),
    ]
}

// Strategy: scalar raw values
fn arb_raw_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        any::<i64>().prop_map(|n| Value::String(n.to_string())),
        prop::sample::select(vec!["true", "no", "1"]).prop_map(Value::from),
        prop::string::string_regex("[a-zA-Z ]{0,10}")
            .unwrap()
            .prop_map(Value::String),
    ]
}

fn arb_input() -> impl Strategy<Value = BTreeMap<String, Value>> {
    prop::collection::btree_map(arb_key(), arb_raw_value(), 0..8)
}

// Strategy: list elements, some of which are not integers
fn arb_list_element() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        any::<i64>().prop_map(|n| Value::String(n.to_string())),
        prop::string::string_regex("[a-z]{1,3}")
            .unwrap()
            .prop_map(Value::String),
    ]
}

proptest! {
    /// Property: cleaned output only ever contains declared output keys
    #[test]
    fn proptest_cleaned_keys_are_declared(input in arb_input()) {
        let schema = schema();
        let declared: Vec<&str> = schema.output_keys().collect();

        let cleaned = schema.clean(input);

        for (key, _) in cleaned.iter() {
            prop_assert!(declared.contains(&key), "undeclared key {}", key);
        }
    }

    /// Property: every field ends up in exactly one place
    ///
    /// A declared field is either stored, recorded as an error, or absent
    /// from the input and not required.
    #[test]
    fn proptest_field_outcomes_are_exclusive(input in arb_input()) {
        let schema = schema();
        let sanitizer = schema.sanitize(input.clone());

        for (field, descriptor) in schema.fields() {
            let stored = sanitizer.get(field).unwrap().is_some();
            let errored = sanitizer.errors().iter().filter(|e| e.field == field).count();

            prop_assert!(errored <= 1);
            prop_assert!(!(stored && errored == 1));
            if !input.contains_key(field) {
                let expected_missing = usize::from(descriptor.options.required);
                prop_assert_eq!(errored, expected_missing);
                if errored == 1 {
                    prop_assert_eq!(sanitizer.errors().iter().find(|e| e.field == field).unwrap().kind, FieldErrorKind::Missing);
                }
            } else {
                prop_assert!(stored || errored == 1);
            }
        }
    }

    /// Property: sanitizing cleaned output again changes nothing
    #[test]
    fn proptest_sanitization_is_idempotent(input in arb_input()) {
        let schema = schema();
        let once = schema.clean(input);

        let twice = schema.clean(RawInput::from(once.clone().into_value()));

        prop_assert_eq!(once, twice);
    }

    /// Property: collection fields convert all elements or none
    #[test]
    fn proptest_collection_is_all_or_nothing(
        items in prop::collection::vec(arb_list_element(), 0..6)
    ) {
        let schema = Schema::builder("CollectionSanitizer")
            .integer(["ids"], FieldOptions::new().collection(true))
            .build();
        let all_integers = items.iter().all(|item| match item {
            Value::Integer(_) => true,
            Value::String(s) => s.parse::<i64>().is_ok(),
            _ => false,
        });

        let sanitizer = schema.sanitize([("ids", Value::List(items.clone()))]);

        if all_integers {
            let stored = sanitizer.get("ids").unwrap().and_then(Value::as_list).unwrap();
            prop_assert_eq!(stored.len(), items.len());
            prop_assert!(stored.iter().all(|v| matches!(v, Value::Integer(_))));
            prop_assert!(sanitizer.is_valid());
        } else {
            prop_assert_eq!(sanitizer.get("ids").unwrap(), None);
            prop_assert_eq!(sanitizer.errors().len(), 1);
            prop_assert_eq!(&sanitizer.errors()[0].value, &Value::List(items));
        }
    }

    /// Property: defaults are converted like input values
    #[test]
    fn proptest_default_goes_through_converter(n in any::<i64>()) {
        let schema = SchemaBuilder::new("DefaultSanitizer")
            .integer(["limit"], FieldOptions::new().default_value(n.to_string()))
            .build();

        let cleaned = schema.clean(RawInput::new());

        prop_assert_eq!(cleaned.get("limit").unwrap(), Some(&Value::Integer(n)));
    }

    /// Property: repeated reads observe one memoized pass
    #[test]
    fn proptest_results_are_stable_across_reads(input in arb_input()) {
        let schema = schema();
        let sanitizer = schema.sanitize(input);

        let first_errors = sanitizer.errors().to_vec();
        let first_cleaned = sanitizer.cleaned().clone();

        prop_assert_eq!(sanitizer.errors(), first_errors.as_slice());
        prop_assert_eq!(sanitizer.cleaned(), &first_cleaned);
        prop_assert_eq!(sanitizer.is_valid(), first_errors.is_empty());
    }
}
