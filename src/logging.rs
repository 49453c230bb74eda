use crate::{ConversionError, FieldErrorKind};

/// Structured log events for one conversion pass.
///
/// `PassLog` is created by the sanitizer at the start of a pass and is
/// lifetime-bound to the schema it reports on. Every event carries the
/// schema name and the field name.
///
/// Raw input values are never logged, only field names, error kinds and
/// converter messages.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PassLog<'a> {
    schema: &'a str,
}

impl<'a> PassLog<'a> {
    pub(crate) fn new(schema: &'a str) -> Self {
        Self { schema }
    }

    /// A converted value was stored.
    pub(crate) fn stored(&self, field: &str, output_key: &str) {
        tracing::trace!(schema = %self.schema, field, output_key, "stored field");
    }

    /// An absent field was filled from its default.
    pub(crate) fn defaulted(&self, field: &str) {
        tracing::trace!(schema = %self.schema, field, "applied default");
    }

    /// A field was recorded as an error.
    pub(crate) fn rejected(&self, field: &str, kind: FieldErrorKind, error: Option<&ConversionError>) {
        match error {
            Some(error) => tracing::debug!(
                schema = %self.schema,
                field,
                kind = %kind,
                reason = %error,
                "field rejected"
            ),
            None => tracing::debug!(schema = %self.schema, field, kind = %kind, "field rejected"),
        }
    }

    /// The pass finished.
    pub(crate) fn finished(&self, stored: usize, errors: usize) {
        tracing::debug!(schema = %self.schema, stored, errors, "sanitization pass complete");
    }

    /// The output container refused a write; indicates a broken schema invariant.
    pub(crate) fn write_refused(&self, output_key: &str, reason: &dyn std::fmt::Display) {
        tracing::error!(schema = %self.schema, output_key, reason = %reason, "output write refused");
    }
}
