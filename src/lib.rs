//! Declarative sanitization of untrusted input.
//!
//! A [`Schema`] declares named, typed fields. Applying it to an arbitrary
//! mapping of raw values (for example parsed request parameters) produces:
//!
//! - a [`RestrictedMap`] holding only declared fields, converted to their types
//! - a list of [`FieldError`]s, one per missing or invalid field
//!
//! Ordinary validation failures never panic or return `Err`; they are data.
//! Only misuse of the API itself (a `custom` field without a converter,
//! reading an undeclared output key) is reported as an error.
//!
//! # Core Types
//!
//! - [`SchemaBuilder`]: declares fields, derives from a base schema
//! - [`Schema`]: the immutable field registry
//! - [`Sanitizer`]: runs one memoized conversion pass over one input
//! - [`Converter`] / [`ConverterKind`]: plain and context-aware converters, built-in kinds
//! - [`NestedSpec`]: a sub-schema used as a converter
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use input_sanitizer::{FieldErrorKind, FieldOptions, Schema, Value};
//! use serde_json::json;
//!
//! let address = Arc::new(
//!     Schema::builder("Address")
//!         .string(["city"], FieldOptions::new().required(true))
//!         .build(),
//! );
//!
//! let signup = Schema::builder("Signup")
//!     .string(["name"], FieldOptions::new().required(true))
//!     .integer(["age"], FieldOptions::new())
//!     .boolean(["newsletter"], FieldOptions::new().default_value(false))
//!     .nested(
//!         ["address"],
//!         FieldOptions::new().sanitizer(address).include_errors(true),
//!     )
//!     .expect("sub-schema given")
//!     .build();
//!
//! let sanitizer = signup.sanitize(json!({
//!     "name": "Alice",
//!     "age": "thirty",
//!     "address": {},
//!     "is_admin": true,
//! }));
//!
//! assert_eq!(sanitizer.get("name"), Ok(Some(&Value::from("Alice"))));
//! assert_eq!(sanitizer.get("newsletter"), Ok(Some(&Value::Bool(false))));
//! assert_eq!(sanitizer.get("age"), Ok(None));
//! assert!(sanitizer.get("is_admin").is_err());
//!
//! let errors: Vec<_> = sanitizer
//!     .errors()
//!     .iter()
//!     .map(|e| (e.field.as_str(), e.kind))
//!     .collect();
//! assert_eq!(
//!     errors,
//!     vec![
//!         ("age", FieldErrorKind::InvalidValue),
//!         ("city", FieldErrorKind::Missing),
//!     ]
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod converter;
pub mod converters;
mod error;
mod input;
mod logging;
mod nested;
mod restricted;
mod sanitizer;
mod schema;
mod value;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::SanitizerConfig;
pub use converter::{allow_nil, ContextFn, Converter, ConverterKind, PlainFn};
pub use error::{ConversionError, FieldError, FieldErrorKind, OutputError, SchemaError};
pub use input::RawInput;
pub use nested::NestedSpec;
pub use restricted::RestrictedMap;
pub use sanitizer::{ConversionContext, Sanitizer};
pub use schema::{FieldConverter, FieldDescriptor, FieldOptions, Schema, SchemaBuilder};
pub use value::Value;
