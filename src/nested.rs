//! Nested sanitizer bridge.
//!
//! A nested field runs a full sanitization pass of another schema over its
//! value. The child's cleaned output becomes the field's value; the child's
//! errors stay private unless the declaration opted into `include_errors`.

use std::sync::Arc;

use crate::sanitizer::ConversionContext;
use crate::{ConversionError, RawInput, Sanitizer, Schema, Value};

/// A sub-schema used as a field converter.
#[derive(Debug, Clone)]
pub struct NestedSpec {
    schema: Arc<Schema>,
    include_errors: bool,
}

impl NestedSpec {
    /// Creates a bridge to `schema`.
    pub fn new(schema: Arc<Schema>, include_errors: bool) -> Self {
        Self {
            schema,
            include_errors,
        }
    }

    /// The child schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Whether the child's errors are merged into the parent's.
    pub fn include_errors(&self) -> bool {
        self.include_errors
    }

    /// Sanitizes `value` with the child schema.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] if `value` is not a map. Errors found by
    /// the child pass are not conversion errors: they are either pushed into
    /// `ctx` or dropped.
    pub fn convert(
        &self,
        value: &Value,
        ctx: &mut ConversionContext<'_>,
    ) -> Result<Value, ConversionError> {
        let Value::Map(entries) = value else {
            return Err(ConversionError::new(format!(
                "expected a mapping for {}, got {}",
                self.schema.name(),
                value.type_name()
            )));
        };

        let child = Sanitizer::new(&self.schema, RawInput::from(entries.clone()));
        let (cleaned, errors) = child.into_parts();

        if self.include_errors && !errors.is_empty() {
            tracing::debug!(
                schema = %ctx.schema_name(),
                field = %ctx.field(),
                nested = %self.schema.name(),
                count = errors.len(),
                "merging nested errors"
            );
            ctx.extend_errors(errors);
        }

        Ok(cleaned.into_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldError, FieldErrorKind, FieldOptions};
    use serde_json::json;

    fn child() -> Arc<Schema> {
        Arc::new(
            Schema::builder("Child")
                .integer(["bar"], FieldOptions::new().required(true))
                .integer(["foo"], FieldOptions::new())
                .build(),
        )
    }

    fn run(spec: &NestedSpec, value: Value) -> (Result<Value, ConversionError>, Vec<FieldError>) {
        let mut errors = Vec::new();
        let result = {
            let mut ctx = ConversionContext::new("Parent", "stuff", &mut errors);
            spec.convert(&value, &mut ctx)
        };
        (result, errors)
    }

    #[test]
    fn converts_through_child_schema() {
        let spec = NestedSpec::new(child(), false);

        let (result, errors) = run(&spec, Value::from(json!({ "foo": "5", "bar": 1 })));

        let expected: Value = [("bar", 1), ("foo", 5)].into_iter().collect();
        assert_eq!(result, Ok(expected));
        assert!(errors.is_empty());
    }

    #[test]
    fn child_errors_hidden_by_default() {
        let spec = NestedSpec::new(child(), false);

        let (result, errors) = run(&spec, Value::from(json!({ "foo": "5" })));

        assert!(result.is_ok());
        assert!(errors.is_empty());
    }

    #[test]
    fn child_errors_merged_when_requested() {
        let spec = NestedSpec::new(child(), true);

        let (result, errors) = run(&spec, Value::from(json!({ "foo": "5" })));

        let expected: Value = [("foo", 5)].into_iter().collect();
        assert_eq!(result, Ok(expected));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "bar");
        assert_eq!(errors[0].kind, FieldErrorKind::Missing);
    }

    #[test]
    fn non_map_value_is_a_conversion_error() {
        let spec = NestedSpec::new(child(), true);

        let (result, errors) = run(&spec, Value::from("nope"));

        let err = result.unwrap_err();
        assert!(err.message().contains("Child"));
        assert!(err.message().contains("string"));
        assert!(errors.is_empty());
    }
}
