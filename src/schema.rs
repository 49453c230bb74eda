use std::sync::Arc;

use crate::nested::NestedSpec;
use crate::sanitizer::ConversionContext;
use crate::{
    ConversionError, Converter, ConverterKind, RawInput, RestrictedMap, Sanitizer,
    SanitizerConfig, SchemaError, Value,
};

/// Per-field policies.
///
/// The policy fields (`required`, `collection`, `namespace`, `default`,
/// `output_key`) end up in the field's [`FieldDescriptor`]. The remaining
/// fields only feed [`SchemaBuilder::custom`] and [`SchemaBuilder::nested`]
/// and are consumed by them.
///
/// # Examples
///
/// ```
/// use input_sanitizer::FieldOptions;
///
/// let options = FieldOptions::new()
///     .required(true)
///     .namespace("value")
///     .output_key("size_id");
///
/// assert!(options.required);
/// assert_eq!(options.namespace.as_deref(), Some("value"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    /// Record a `missing` error when the field is absent and has no default.
    pub required: bool,
    /// The raw value is a list; convert each element.
    pub collection: bool,
    /// The raw value is a map; convert the entry under this key and keep the wrapper.
    pub namespace: Option<String>,
    /// Value converted and stored when the field is absent.
    pub default: Option<Value>,
    /// Store the result under this key instead of the field name.
    pub output_key: Option<String>,
    /// Converter for [`SchemaBuilder::custom`].
    pub converter: Option<Converter>,
    /// Sub-schema for [`SchemaBuilder::nested`].
    pub sanitizer: Option<Arc<Schema>>,
    /// Merge a nested sanitizer's errors into the parent's.
    pub include_errors: bool,
}

impl FieldOptions {
    /// Options with every policy off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `required`.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets `collection`.
    pub fn collection(mut self, collection: bool) -> Self {
        self.collection = collection;
        self
    }

    /// Sets `namespace`.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets `default`.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets `output_key`.
    pub fn output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    /// Sets the converter used by [`SchemaBuilder::custom`].
    pub fn converter(mut self, converter: impl Into<Converter>) -> Self {
        self.converter = Some(converter.into());
        self
    }

    /// Sets the sub-schema used by [`SchemaBuilder::nested`].
    pub fn sanitizer(mut self, schema: impl Into<Arc<Schema>>) -> Self {
        self.sanitizer = Some(schema.into());
        self
    }

    /// Sets `include_errors`.
    pub fn include_errors(mut self, include: bool) -> Self {
        self.include_errors = include;
        self
    }

    fn policies_only(mut self) -> Self {
        self.converter = None;
        self.sanitizer = None;
        self
    }
}

/// How a field's value is converted.
#[derive(Debug, Clone)]
pub enum FieldConverter {
    /// A plain or context-aware converter.
    Convert(Converter),
    /// A nested sub-schema.
    Nested(NestedSpec),
}

impl FieldConverter {
    /// Converts one value.
    pub fn call(
        &self,
        value: &Value,
        ctx: &mut ConversionContext<'_>,
    ) -> Result<Value, ConversionError> {
        match self {
            FieldConverter::Convert(converter) => converter.call(value, ctx),
            FieldConverter::Nested(spec) => spec.convert(value, ctx),
        }
    }
}

/// A declared field: its converter and its policies.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Converter for the field's value(s).
    pub converter: FieldConverter,
    /// Policies for the field.
    pub options: FieldOptions,
    kind: &'static str,
}

impl FieldDescriptor {
    /// Name of the converter kind (`"integer"`, `"custom"`, `"nested"`, ...).
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Key under which `field` is stored in the output.
    pub fn output_key<'a>(&'a self, field: &'a str) -> &'a str {
        self.options.output_key.as_deref().unwrap_or(field)
    }
}

/// An immutable set of field declarations.
///
/// Built once with a [`SchemaBuilder`] and then shared (typically behind an
/// [`Arc`] or in a `static`) by every sanitization that uses it. Fields keep
/// declaration order.
///
/// # Examples
///
/// ```
/// use input_sanitizer::{FieldOptions, Schema, Value};
/// use serde_json::json;
///
/// let schema = Schema::builder("Basic")
///     .string(["x", "y", "z"], FieldOptions::new())
///     .integer(["num"], FieldOptions::new())
///     .build();
///
/// let sanitizer = schema.sanitize(json!({ "x": 3, "y": "tom", "num": "mike" }));
///
/// assert_eq!(sanitizer.get("x"), Ok(Some(&Value::from("3"))));
/// assert_eq!(sanitizer.get("z"), Ok(None));
/// assert_eq!(sanitizer.errors().len(), 1);
/// assert_eq!(sanitizer.errors()[0].description.as_deref(), Some("invalid integer"));
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: Vec<(String, FieldDescriptor)>,
}

impl Schema {
    /// Starts declaring a new schema.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// Schema name, used in logs and error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(name, d)| (name.as_str(), d))
    }

    /// Looks up a field by its declared name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, d)| d)
    }

    /// Output keys (declared names with aliases applied), in declaration order.
    pub fn output_keys(&self) -> impl Iterator<Item = &str> {
        self.fields().map(|(name, d)| d.output_key(name))
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Creates a sanitizer over `input` with the default configuration.
    pub fn sanitize(&self, input: impl Into<RawInput>) -> Sanitizer<'_> {
        Sanitizer::new(self, input)
    }

    /// Creates a sanitizer over `input` with an explicit configuration.
    pub fn sanitize_with(
        &self,
        input: impl Into<RawInput>,
        config: SanitizerConfig,
    ) -> Sanitizer<'_> {
        Sanitizer::with_config(self, input, config)
    }

    /// Sanitizes `input` and returns only the cleaned output.
    pub fn clean(&self, input: impl Into<RawInput>) -> RestrictedMap {
        Sanitizer::new(self, input).into_cleaned()
    }
}

macro_rules! shorthand {
    ($($(#[$doc:meta])* $method:ident => $kind:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $method<N>(self, names: N, options: FieldOptions) -> Self
            where
                N: IntoIterator,
                N::Item: Into<String>,
            {
                self.declare(ConverterKind::$kind, names, options)
            }
        )*
    };
}

/// Mutable registry used while a schema is being declared.
///
/// Declarations are applied in call order; declaring a name again replaces
/// the earlier descriptor in place. [`derive`](Self::derive) starts from a
/// copy of another schema's registry, which is never modified afterwards.
///
/// # Examples
///
/// ```
/// use input_sanitizer::{FieldOptions, Schema, SchemaBuilder, Value};
/// use serde_json::json;
///
/// let base = Schema::builder("Base")
///     .integer(["num"], FieldOptions::new())
///     .build();
///
/// let extended = SchemaBuilder::derive(&base, "Extended")
///     .boolean(["is_nice"], FieldOptions::new())
///     .build();
///
/// let cleaned = extended.clean(json!({ "num": "23", "is_nice": "false" }));
/// assert_eq!(cleaned.get("num"), Ok(Some(&Value::Integer(23))));
/// assert_eq!(cleaned.get("is_nice"), Ok(Some(&Value::Bool(false))));
/// assert_eq!(base.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<(String, FieldDescriptor)>,
}

impl SchemaBuilder {
    /// Starts an empty registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Starts a registry from a copy of `base`'s fields.
    pub fn derive(base: &Schema, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: base.fields.clone(),
        }
    }

    /// Declares `names` with a built-in converter kind.
    pub fn declare<N>(mut self, kind: ConverterKind, names: N, options: FieldOptions) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
    {
        let converter = FieldConverter::Convert(kind.converter());
        let options = options.policies_only();
        for name in names {
            self.insert(name.into(), converter.clone(), options.clone(), kind.name());
        }
        self
    }

    shorthand! {
        /// Declares integer fields.
        integer => Integer;
        /// Declares integer fields that accept blank input as null.
        integer_or_blank => IntegerOrBlank;
        /// Declares float fields.
        float => Float;
        /// Declares float fields that accept blank input as null.
        float_or_blank => FloatOrBlank;
        /// Declares string fields.
        string => String;
        /// Declares string fields that accept blank input as null.
        string_or_blank => StringOrBlank;
        /// Declares date fields.
        date => Date;
        /// Declares date fields that accept blank input as null.
        date_or_blank => DateOrBlank;
        /// Declares timestamp fields.
        time => Time;
        /// Declares timestamp fields that accept blank input as null.
        time_or_blank => TimeOrBlank;
        /// Declares boolean fields.
        boolean => Boolean;
        /// Declares boolean fields that accept blank input as null.
        boolean_or_blank => BooleanOrBlank;
    }

    /// Declares `names` with the converter carried in `options`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingConverter`] if `options.converter` is unset.
    pub fn custom<N>(mut self, names: N, mut options: FieldOptions) -> Result<Self, SchemaError>
    where
        N: IntoIterator,
        N::Item: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let converter = options
            .converter
            .take()
            .ok_or_else(|| SchemaError::MissingConverter {
                fields: names.clone(),
            })?;
        let converter = FieldConverter::Convert(converter);
        let options = options.policies_only();
        for name in names {
            self.insert(name, converter.clone(), options.clone(), "custom");
        }
        Ok(self)
    }

    /// Declares `names` as nested sub-schemas.
    ///
    /// Each value is sanitized with `options.sanitizer`; the child's cleaned
    /// output becomes the field's value. With `include_errors` the child's
    /// errors are appended to the parent's.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingSanitizer`] if `options.sanitizer` is unset.
    pub fn nested<N>(mut self, names: N, mut options: FieldOptions) -> Result<Self, SchemaError>
    where
        N: IntoIterator,
        N::Item: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let schema = options
            .sanitizer
            .take()
            .ok_or_else(|| SchemaError::MissingSanitizer {
                fields: names.clone(),
            })?;
        let converter = FieldConverter::Nested(NestedSpec::new(schema, options.include_errors));
        let options = options.policies_only();
        for name in names {
            self.insert(name, converter.clone(), options.clone(), "nested");
        }
        Ok(self)
    }

    /// Freezes the registry into a [`Schema`].
    pub fn build(self) -> Schema {
        Schema {
            name: self.name,
            fields: self.fields,
        }
    }

    fn insert(
        &mut self,
        name: String,
        converter: FieldConverter,
        options: FieldOptions,
        kind: &'static str,
    ) {
        let descriptor = FieldDescriptor {
            converter,
            options,
            kind,
        };
        match self.fields.iter().position(|(field, _)| *field == name) {
            Some(index) => {
                tracing::trace!(schema = %self.name, field = %name, kind, "overriding field");
                self.fields[index].1 = descriptor;
            }
            None => self.fields.push((name, descriptor)),
        }
    }
}
