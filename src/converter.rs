use std::fmt;
use std::sync::Arc;

use crate::converters;
use crate::sanitizer::ConversionContext;
use crate::{ConversionError, Value};

/// Signature of a unary converter.
pub type PlainFn = dyn Fn(&Value) -> Result<Value, ConversionError> + Send + Sync;

/// Signature of a converter that also receives the running sanitization pass.
pub type ContextFn =
    dyn Fn(&Value, &mut ConversionContext<'_>) -> Result<Value, ConversionError> + Send + Sync;

/// A field converter.
///
/// The two shapes are dispatched explicitly in [`call`](Self::call):
///
/// - [`Plain`](Converter::Plain) sees only the raw value. All built-in kinds are plain.
/// - [`WithContext`](Converter::WithContext) also gets the [`ConversionContext`] of
///   the enclosing pass, so it can push errors into the parent's error list.
///   Nested sanitizers use this shape.
///
/// Converters are cheap to clone and can be shared between schemas.
///
/// # Examples
///
/// ```
/// use input_sanitizer::{ConversionError, Converter, Value};
///
/// let reverse = Converter::plain(|value| match value.as_str() {
///     Some(s) => Ok(Value::from(s.chars().rev().collect::<String>())),
///     None => Err(ConversionError::new("expected a string")),
/// });
///
/// let lenient = reverse.allow_nil();
/// # let _ = lenient;
/// ```
#[derive(Clone)]
pub enum Converter {
    /// `value -> typed`
    Plain(Arc<PlainFn>),
    /// `(value, pass) -> typed`
    WithContext(Arc<ContextFn>),
}

impl Converter {
    /// Wraps a unary function.
    pub fn plain<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        Converter::Plain(Arc::new(f))
    }

    /// Wraps a function that needs the enclosing pass.
    pub fn with_context<F>(f: F) -> Self
    where
        F: Fn(&Value, &mut ConversionContext<'_>) -> Result<Value, ConversionError>
            + Send
            + Sync
            + 'static,
    {
        Converter::WithContext(Arc::new(f))
    }

    /// Invokes the converter with the argument list its shape expects.
    pub fn call(
        &self,
        value: &Value,
        ctx: &mut ConversionContext<'_>,
    ) -> Result<Value, ConversionError> {
        match self {
            Converter::Plain(f) => f(value),
            Converter::WithContext(f) => f(value, ctx),
        }
    }

    /// Returns a converter that maps null and `""` to null without calling `self`.
    ///
    /// See [`allow_nil`].
    pub fn allow_nil(self) -> Self {
        allow_nil(self)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Converter::Plain(_) => write!(f, "Converter::Plain(..)"),
            Converter::WithContext(_) => write!(f, "Converter::WithContext(..)"),
        }
    }
}

/// Allow-nil modifier.
///
/// Null and empty-string input produce [`Value::Null`] immediately; anything
/// else is delegated to `converter`, whose result or failure is returned
/// unchanged. The wrapped converter keeps its shape.
///
/// ```
/// use input_sanitizer::{allow_nil, converters, Converter, Value};
///
/// let converter = allow_nil(Converter::plain(converters::integer));
/// # let _ = converter;
/// ```
pub fn allow_nil(converter: Converter) -> Converter {
    match converter {
        Converter::Plain(inner) => Converter::plain(move |value| {
            if value.is_blank() {
                Ok(Value::Null)
            } else {
                inner(value)
            }
        }),
        Converter::WithContext(inner) => Converter::with_context(move |value, ctx| {
            if value.is_blank() {
                Ok(Value::Null)
            } else {
                inner(value, ctx)
            }
        }),
    }
}

/// Built-in converter kinds accepted by [`SchemaBuilder::declare`](crate::SchemaBuilder::declare).
///
/// `*OrBlank` kinds are the base kind wrapped in [`allow_nil`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConverterKind {
    /// Canonical decimal integers
    Integer,
    /// [`Integer`](Self::Integer), blank as null
    IntegerOrBlank,
    /// Integers greater than zero
    PositiveInteger,
    /// Floats and numeric strings
    Float,
    /// [`Float`](Self::Float), blank as null
    FloatOrBlank,
    /// String form of any value
    String,
    /// [`String`](Self::String), blank as null
    StringOrBlank,
    /// Strings that must not be blank
    NotBlankString,
    /// ISO 8601 dates
    Date,
    /// [`Date`](Self::Date), blank as null
    DateOrBlank,
    /// ISO 8601 timestamps without offset, as UTC
    Time,
    /// [`Time`](Self::Time), blank as null
    TimeOrBlank,
    /// Boolean literals
    Boolean,
    /// [`Boolean`](Self::Boolean), blank as null
    BooleanOrBlank,
    /// `"1,2,3"` into a list of integers
    CommaJoinedIntegers,
    /// `"a,b,c"` into a list of strings
    CommaJoinedStrings,
    /// One of a fixed set of strings
    SpecificValues(Vec<String>),
}

impl ConverterKind {
    /// Resolves the kind to a converter.
    pub fn converter(&self) -> Converter {
        match self {
            ConverterKind::Integer => Converter::plain(converters::integer),
            ConverterKind::IntegerOrBlank => Converter::plain(converters::integer).allow_nil(),
            ConverterKind::PositiveInteger => Converter::plain(converters::positive_integer),
            ConverterKind::Float => Converter::plain(converters::float),
            ConverterKind::FloatOrBlank => Converter::plain(converters::float).allow_nil(),
            ConverterKind::String => Converter::plain(converters::string),
            ConverterKind::StringOrBlank => Converter::plain(converters::string).allow_nil(),
            ConverterKind::NotBlankString => Converter::plain(converters::not_blank_string),
            ConverterKind::Date => Converter::plain(converters::date),
            ConverterKind::DateOrBlank => Converter::plain(converters::date).allow_nil(),
            ConverterKind::Time => Converter::plain(converters::time),
            ConverterKind::TimeOrBlank => Converter::plain(converters::time).allow_nil(),
            ConverterKind::Boolean => Converter::plain(converters::boolean),
            ConverterKind::BooleanOrBlank => Converter::plain(converters::boolean).allow_nil(),
            ConverterKind::CommaJoinedIntegers => {
                Converter::plain(converters::comma_joined_integers)
            }
            ConverterKind::CommaJoinedStrings => {
                Converter::plain(converters::comma_joined_strings)
            }
            ConverterKind::SpecificValues(allowed) => {
                let allowed = allowed.clone();
                Converter::plain(move |value| converters::specific_values(value, &allowed))
            }
        }
    }

    /// Snake-case name, as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ConverterKind::Integer => "integer",
            ConverterKind::IntegerOrBlank => "integer_or_blank",
            ConverterKind::PositiveInteger => "positive_integer",
            ConverterKind::Float => "float",
            ConverterKind::FloatOrBlank => "float_or_blank",
            ConverterKind::String => "string",
            ConverterKind::StringOrBlank => "string_or_blank",
            ConverterKind::NotBlankString => "not_blank_string",
            ConverterKind::Date => "date",
            ConverterKind::DateOrBlank => "date_or_blank",
            ConverterKind::Time => "time",
            ConverterKind::TimeOrBlank => "time_or_blank",
            ConverterKind::Boolean => "boolean",
            ConverterKind::BooleanOrBlank => "boolean_or_blank",
            ConverterKind::CommaJoinedIntegers => "comma_joined_integers",
            ConverterKind::CommaJoinedStrings => "comma_joined_strings",
            ConverterKind::SpecificValues(_) => "specific_values",
        }
    }
}

impl From<ConverterKind> for Converter {
    fn from(kind: ConverterKind) -> Self {
        kind.converter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldError;

    fn call(converter: &Converter, value: Value) -> Result<Value, ConversionError> {
        let mut errors = Vec::new();
        let mut ctx = ConversionContext::new("Test", "field", &mut errors);
        converter.call(&value, &mut ctx)
    }

    #[test]
    fn allow_nil_passes_blanks() {
        let converter = allow_nil(Converter::plain(|_| Ok(Value::Integer(1))));

        assert_eq!(call(&converter, Value::from("")), Ok(Value::Null));
        assert_eq!(call(&converter, Value::Null), Ok(Value::Null));
    }

    #[test]
    fn allow_nil_delegates_everything_else() {
        let converter = allow_nil(Converter::plain(|_| Ok(Value::from("something"))));

        assert_eq!(call(&converter, Value::from("stuff")), Ok(Value::from("something")));
    }

    #[test]
    fn allow_nil_propagates_failures() {
        let converter = allow_nil(Converter::plain(|_| Err(ConversionError::new("Some error"))));

        assert_eq!(
            call(&converter, Value::from("stuff")),
            Err(ConversionError::new("Some error"))
        );
    }

    #[test]
    fn allow_nil_keeps_context_shape() {
        let converter = Converter::with_context(|value, ctx| {
            ctx.push_error(FieldError::missing("inner"));
            Ok(value.clone())
        })
        .allow_nil();

        let mut errors = Vec::new();
        {
            let mut ctx = ConversionContext::new("Test", "field", &mut errors);
            assert_eq!(converter.call(&Value::Null, &mut ctx), Ok(Value::Null));
            assert_eq!(
                converter.call(&Value::Integer(3), &mut ctx),
                Ok(Value::Integer(3))
            );
        }
        assert_eq!(errors, vec![FieldError::missing("inner")]);
    }

    #[test]
    fn or_blank_kinds_accept_blank_input() {
        for kind in [
            ConverterKind::IntegerOrBlank,
            ConverterKind::StringOrBlank,
            ConverterKind::DateOrBlank,
            ConverterKind::TimeOrBlank,
            ConverterKind::BooleanOrBlank,
            ConverterKind::FloatOrBlank,
        ] {
            assert_eq!(
                call(&kind.converter(), Value::from("")),
                Ok(Value::Null),
                "kind {}",
                kind.name()
            );
        }
    }

    #[test]
    fn base_kinds_reject_blank_where_the_converter_does() {
        assert!(call(&ConverterKind::Integer.converter(), Value::from("")).is_err());
        assert!(call(&ConverterKind::Boolean.converter(), Value::Null).is_err());
        assert_eq!(
            call(&ConverterKind::String.converter(), Value::Null),
            Ok(Value::from(""))
        );
    }

    #[test]
    fn specific_values_kind_captures_its_list() {
        let kind = ConverterKind::SpecificValues(vec!["a".into(), "b".into()]);

        assert_eq!(call(&kind.converter(), Value::from("a")), Ok(Value::from("a")));
        assert!(call(&kind.converter(), Value::from("c")).is_err());
    }

    #[test]
    fn debug_names_the_shape() {
        let plain = Converter::from(ConverterKind::Integer);
        assert_eq!(format!("{:?}", plain), "Converter::Plain(..)");

        let ctx = Converter::with_context(|v, _| Ok(v.clone()));
        assert_eq!(format!("{:?}", ctx), "Converter::WithContext(..)");
    }
}
