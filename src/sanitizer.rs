use std::sync::OnceLock;

use crate::logging::PassLog;
use crate::schema::FieldDescriptor;
use crate::{
    ConversionError, FieldError, FieldErrorKind, OutputError, RawInput, RestrictedMap,
    SanitizerConfig, Schema, Value,
};

/// Handle on the running pass, given to context-aware converters.
///
/// Gives access to the schema and field being converted and lets the
/// converter append errors to the enclosing sanitizer's error list.
///
/// # Examples
///
/// ```
/// use input_sanitizer::{Converter, FieldError, FieldOptions, Schema, Value};
/// use serde_json::json;
///
/// let flag_empty = Converter::with_context(|value, ctx| {
///     if value.as_str() == Some("") {
///         let field = ctx.field().to_string();
///         ctx.push_error(FieldError::invalid_value(field, value.clone(), "suspicious"));
///     }
///     Ok(value.clone())
/// });
///
/// let schema = Schema::builder("S")
///     .custom(["note"], FieldOptions::new().converter(flag_empty))
///     .unwrap()
///     .build();
///
/// let sanitizer = schema.sanitize(json!({ "note": "" }));
/// assert_eq!(sanitizer.get("note"), Ok(Some(&Value::from(""))));
/// assert_eq!(sanitizer.errors().len(), 1);
/// ```
#[derive(Debug)]
pub struct ConversionContext<'a> {
    schema: &'a str,
    field: &'a str,
    errors: &'a mut Vec<FieldError>,
}

impl<'a> ConversionContext<'a> {
    pub(crate) fn new(schema: &'a str, field: &'a str, errors: &'a mut Vec<FieldError>) -> Self {
        Self {
            schema,
            field,
            errors,
        }
    }

    /// Name of the schema being applied.
    pub fn schema_name(&self) -> &str {
        self.schema
    }

    /// Declared name of the field being converted.
    pub fn field(&self) -> &str {
        self.field
    }

    /// Appends one error to the enclosing sanitizer's error list.
    pub fn push_error(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Appends several errors to the enclosing sanitizer's error list.
    pub fn extend_errors(&mut self, errors: impl IntoIterator<Item = FieldError>) {
        self.errors.extend(errors);
    }
}

#[derive(Debug)]
struct Outcome {
    cleaned: RestrictedMap,
    errors: Vec<FieldError>,
}

/// Applies a [`Schema`] to one raw input.
///
/// Construction only snapshots the input. The conversion pass runs on first
/// access to [`cleaned`](Self::cleaned), [`errors`](Self::errors),
/// [`is_valid`](Self::is_valid) or [`get`](Self::get), exactly once; later
/// calls return the memoized result.
///
/// For every declared field, in declaration order:
///
/// 1. present in the input: convert it and store the result under the
///    field's output key, or record an `invalid_value` error and store nothing;
/// 2. absent with a default: convert the default and store it;
/// 3. absent and required: record a `missing` error;
/// 4. otherwise leave it out of the output.
///
/// Unless `SanitizerConfig::freeze_output` is off, the output is frozen at
/// the end of the pass.
///
/// # Examples
///
/// ```
/// use input_sanitizer::{FieldErrorKind, FieldOptions, Sanitizer, Schema, Value};
/// use serde_json::json;
///
/// let schema = Schema::builder("Signup")
///     .string(["name"], FieldOptions::new().required(true))
///     .integer(["age"], FieldOptions::new())
///     .build();
///
/// let sanitizer = Sanitizer::new(&schema, json!({ "age": "abc", "admin": true }));
///
/// assert!(!sanitizer.is_valid());
/// let kinds: Vec<_> = sanitizer.errors().iter().map(|e| e.kind).collect();
/// assert_eq!(kinds, vec![FieldErrorKind::Missing, FieldErrorKind::InvalidValue]);
/// assert!(sanitizer.cleaned().is_empty());
/// assert!(sanitizer.get("admin").is_err());
/// ```
#[derive(Debug)]
pub struct Sanitizer<'s> {
    schema: &'s Schema,
    data: RawInput,
    config: SanitizerConfig,
    outcome: OnceLock<Outcome>,
}

impl<'s> Sanitizer<'s> {
    /// Snapshots `input` for `schema` with the default configuration.
    pub fn new(schema: &'s Schema, input: impl Into<RawInput>) -> Self {
        Self::with_config(schema, input, SanitizerConfig::default())
    }

    /// Snapshots `input` for `schema` with an explicit configuration.
    pub fn with_config(
        schema: &'s Schema,
        input: impl Into<RawInput>,
        config: SanitizerConfig,
    ) -> Self {
        Self {
            schema,
            data: input.into(),
            config,
            outcome: OnceLock::new(),
        }
    }

    /// The schema being applied.
    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// The raw input snapshot.
    pub fn raw(&self) -> &RawInput {
        &self.data
    }

    /// Returns `true` once the conversion pass has run.
    pub fn is_performed(&self) -> bool {
        self.outcome.get().is_some()
    }

    /// The cleaned output, running the pass if needed.
    pub fn cleaned(&self) -> &RestrictedMap {
        &self.outcome().cleaned
    }

    /// Errors recorded by the pass, running it if needed.
    pub fn errors(&self) -> &[FieldError] {
        &self.outcome().errors
    }

    /// Returns `true` if the pass recorded no error.
    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    /// Reads one output key.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::KeyNotAllowed`] if `key` is not an output key of the schema.
    pub fn get(&self, key: &str) -> Result<Option<&Value>, OutputError> {
        self.cleaned().get(key)
    }

    /// Consumes the sanitizer, returning the cleaned output.
    pub fn into_cleaned(self) -> RestrictedMap {
        self.into_parts().0
    }

    /// Consumes the sanitizer, returning the cleaned output and the errors.
    pub fn into_parts(mut self) -> (RestrictedMap, Vec<FieldError>) {
        let outcome = match self.outcome.take() {
            Some(outcome) => outcome,
            None => self.perform(),
        };
        (outcome.cleaned, outcome.errors)
    }

    fn outcome(&self) -> &Outcome {
        self.outcome.get_or_init(|| self.perform())
    }

    fn perform(&self) -> Outcome {
        let schema_name = self.schema.name();
        let _span = tracing::debug_span!("sanitize", schema = %schema_name).entered();
        let log = PassLog::new(schema_name);

        let mut cleaned = RestrictedMap::new(self.schema.output_keys());
        let mut errors = Vec::new();

        for (field, descriptor) in self.schema.fields() {
            self.clean_field(field, descriptor, &mut cleaned, &mut errors, log);
        }

        if self.config.freeze_output {
            cleaned.freeze();
        }
        log.finished(cleaned.len(), errors.len());

        Outcome { cleaned, errors }
    }

    fn clean_field(
        &self,
        field: &str,
        descriptor: &FieldDescriptor,
        cleaned: &mut RestrictedMap,
        errors: &mut Vec<FieldError>,
        log: PassLog<'_>,
    ) {
        let output_key = descriptor.output_key(field);
        let schema_name = self.schema.name();

        let converted = if let Some(raw) = self.data.get(field) {
            let mut ctx = ConversionContext::new(schema_name, field, errors);
            match convert(descriptor, raw, &mut ctx) {
                Ok(value) => value,
                Err(error) => {
                    log.rejected(field, FieldErrorKind::InvalidValue, Some(&error));
                    errors.push(FieldError::invalid_value(field, raw.clone(), error.message()));
                    return;
                }
            }
        } else if let Some(default) = &descriptor.options.default {
            let mut ctx = ConversionContext::new(schema_name, field, errors);
            match descriptor.converter.call(default, &mut ctx) {
                Ok(value) => {
                    log.defaulted(field);
                    value
                }
                Err(error) => {
                    log.rejected(field, FieldErrorKind::InvalidValue, Some(&error));
                    errors.push(FieldError::invalid_value(
                        field,
                        default.clone(),
                        error.message(),
                    ));
                    return;
                }
            }
        } else if descriptor.options.required {
            log.rejected(field, FieldErrorKind::Missing, None);
            errors.push(FieldError::missing(field));
            return;
        } else {
            return;
        };

        match cleaned.insert(output_key, converted) {
            Ok(_) => log.stored(field, output_key),
            Err(error) => log.write_refused(output_key, &error),
        }
    }
}

/// Converts a field's raw value, honoring `collection` and `namespace`.
///
/// A collection fails as a whole on its first failing element.
fn convert(
    descriptor: &FieldDescriptor,
    raw: &Value,
    ctx: &mut ConversionContext<'_>,
) -> Result<Value, ConversionError> {
    if !descriptor.options.collection {
        return convert_single(descriptor, raw, ctx);
    }
    let items = raw.as_list().ok_or_else(|| {
        ConversionError::new(format!("expected a list, got {}", raw.type_name()))
    })?;
    items
        .iter()
        .map(|item| convert_single(descriptor, item, ctx))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

fn convert_single(
    descriptor: &FieldDescriptor,
    raw: &Value,
    ctx: &mut ConversionContext<'_>,
) -> Result<Value, ConversionError> {
    let Some(namespace) = &descriptor.options.namespace else {
        return descriptor.converter.call(raw, ctx);
    };
    let entries = raw.as_map().ok_or_else(|| {
        ConversionError::new(format!(
            "expected a mapping with key '{}', got {}",
            namespace,
            raw.type_name()
        ))
    })?;
    let null = Value::Null;
    let inner = entries.get(namespace).unwrap_or(&null);
    let converted = descriptor.converter.call(inner, ctx)?;
    Ok([(namespace.clone(), converted)].into_iter().collect())
}
