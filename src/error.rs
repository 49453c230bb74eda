use std::fmt;

use serde::Serialize;

use crate::Value;

/// Error returned by a converter when a raw value cannot be converted.
///
/// The message is human readable and ends up as the `description` of the
/// [`FieldError`] recorded for the field. It never escapes the per-field
/// boundary of a sanitization pass.
///
/// # Examples
///
/// ```
/// use input_sanitizer::ConversionError;
///
/// let error = ConversionError::new("invalid integer");
/// assert_eq!(error.message(), "invalid integer");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    message: String,
}

impl ConversionError {
    /// Creates a new conversion error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConversionError {}

/// Kind of a per-field sanitization error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// A required field was absent and had no default.
    Missing,
    /// The field was present but its value failed conversion.
    InvalidValue,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::InvalidValue => write!(f, "invalid_value"),
        }
    }
}

/// A per-field error record, collected as data rather than raised.
///
/// Serializes to `{"field", "type", "value", "description"}`, which is the
/// shape usually handed back to API clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Field name as declared in the schema.
    pub field: String,
    /// What went wrong.
    #[serde(rename = "type")]
    pub kind: FieldErrorKind,
    /// The offending raw value, or null for missing fields.
    pub value: Value,
    /// Converter message for invalid values.
    pub description: Option<String>,
}

impl FieldError {
    /// Creates a `missing` error for a required field.
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::Missing,
            value: Value::Null,
            description: None,
        }
    }

    /// Creates an `invalid_value` error carrying the raw value and the converter message.
    pub fn invalid_value(
        field: impl Into<String>,
        value: Value,
        description: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::InvalidValue,
            value,
            description: Some(description.into()),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(desc) => write!(f, "{}: {} ({})", self.field, self.kind, desc),
            None => write!(f, "{}: {}", self.field, self.kind),
        }
    }
}

/// Schema-definition misuse, reported when the declaration is made.
///
/// These are defects in the calling code, not in the input data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// `custom` was called without a converter.
    MissingConverter {
        /// Fields named in the failed declaration
        fields: Vec<String>,
    },
    /// `nested` was called without a sub-schema.
    MissingSanitizer {
        /// Fields named in the failed declaration
        fields: Vec<String>,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::MissingConverter { fields } => write!(
                f,
                "no converter defined for custom field(s): {}",
                fields.join(", ")
            ),
            SchemaError::MissingSanitizer { fields } => write!(
                f,
                "no sanitizer defined for nested field(s): {}",
                fields.join(", ")
            ),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Misuse of a [`RestrictedMap`](crate::RestrictedMap).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputError {
    /// The key is not part of the map's declared key set.
    KeyNotAllowed {
        /// The rejected key
        key: String,
    },
    /// A write was attempted after the map was frozen.
    Frozen {
        /// The key that was being written
        key: String,
    },
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::KeyNotAllowed { key } => write!(f, "key not allowed: '{}'", key),
            OutputError::Frozen { key } => {
                write!(f, "cannot write '{}': output is frozen", key)
            }
        }
    }
}

impl std::error::Error for OutputError {}
