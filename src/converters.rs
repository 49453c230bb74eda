//! Built-in primitive converters.
//!
//! Every converter here is a plain function `&Value -> Result<Value, ConversionError>`
//! with no side effects. They are wrapped into [`Converter`](crate::Converter)s by
//! [`ConverterKind`](crate::ConverterKind) and can also be used directly.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::Regex;

use crate::{ConversionError, Value};

static DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-?(\d{2})-?(\d{2})").expect("Invalid date regex")
});

// Optional `T`/space separator, optional colons, up to three fractional digits
// and a trailing `Z`. Explicit offsets do not match.
static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})-?(\d{2})-?(\d{2})(?:[T ]?(\d{2})(?::?(\d{2})(?::?(\d{2})(?:\.?\d{0,3}Z?)?)?)?)?$",
    )
    .expect("Invalid timestamp regex")
});

static COMMA_JOINED_INTEGERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(?:,[0-9]+)*$").expect("Invalid integer list regex"));

// ASCII word characters only; `\w` would admit any Unicode letter.
static COMMA_JOINED_STRINGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+(?:,[A-Za-z0-9_-]+)*$").expect("Invalid string list regex")
});

// `_` is only legal between two digits.
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?[0-9]+(?:_[0-9]+)*(?:\.[0-9]+(?:_[0-9]+)*)?(?:[eE][+-]?[0-9]+(?:_[0-9]+)*)?$")
        .expect("Invalid decimal regex")
});

const TRUE_LITERALS: [&str; 4] = ["true", "True", "1", "yes"];
const FALSE_LITERALS: [&str; 4] = ["false", "False", "0", "no"];

/// Converts to an integer.
///
/// Integers pass through. Strings must be the canonical decimal form of an
/// `i64`: `"42"` and `"-3"` convert, `"042"`, `" 42"` and `"4.0"` do not.
///
/// ```
/// use input_sanitizer::{converters, Value};
///
/// assert_eq!(converters::integer(&Value::from("42")), Ok(Value::Integer(42)));
/// assert!(converters::integer(&Value::from("f")).is_err());
/// ```
pub fn integer(value: &Value) -> Result<Value, ConversionError> {
    parse_integer(value)
        .map(Value::Integer)
        .ok_or_else(|| ConversionError::new("invalid integer"))
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::String(s) => s.parse::<i64>().ok().filter(|n| n.to_string() == *s),
        _ => None,
    }
}

/// Converts to a strictly positive integer.
pub fn positive_integer(value: &Value) -> Result<Value, ConversionError> {
    match parse_integer(value) {
        Some(n) if n > 0 => Ok(Value::Integer(n)),
        _ => Err(ConversionError::new("invalid positive integer")),
    }
}

/// Converts to a float.
///
/// Integers widen, floats pass through, and numeric strings parse with
/// surrounding whitespace and `_` separators between digits allowed. `inf`/`NaN`
/// spellings are rejected.
pub fn float(value: &Value) -> Result<Value, ConversionError> {
    let invalid = || ConversionError::new("invalid decimal");
    match value {
        Value::Integer(i) => Ok(Value::Float(*i as f64)),
        Value::Float(x) => Ok(Value::Float(*x)),
        Value::String(s) => {
            let trimmed = s.trim();
            if !DECIMAL.is_match(trimmed) {
                return Err(invalid());
            }
            trimmed
                .replace('_', "")
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| invalid())
        }
        _ => Err(invalid()),
    }
}

/// Converts any value to its string form. Never fails.
///
/// See the [`Display`](std::fmt::Display) impl of [`Value`] for the exact rendering.
pub fn string(value: &Value) -> Result<Value, ConversionError> {
    Ok(Value::String(value.to_string()))
}

/// Like [`string`], but null and the empty string are rejected.
pub fn not_blank_string(value: &Value) -> Result<Value, ConversionError> {
    if value.is_blank() {
        return Err(ConversionError::new("empty string"));
    }
    string(value)
}

/// Converts an ISO 8601 date (`YYYY-MM-DD` or `YYYYMMDD` prefix) to a date.
///
/// ```
/// use chrono::NaiveDate;
/// use input_sanitizer::{converters, Value};
///
/// let date = NaiveDate::from_ymd_opt(2012, 5, 15).unwrap();
/// assert_eq!(converters::date(&Value::from("2012-05-15")), Ok(Value::Date(date)));
/// assert!(converters::date(&Value::from("2012-02-30")).is_err());
/// ```
pub fn date(value: &Value) -> Result<Value, ConversionError> {
    let invalid = || ConversionError::new("invalid iso8601 date");
    match value {
        Value::Date(d) => Ok(Value::Date(*d)),
        Value::String(s) => {
            let caps = DATE_PREFIX.captures(s).ok_or_else(invalid)?;
            let year = caps[1].parse::<i32>().map_err(|_| invalid())?;
            let month = caps[2].parse::<u32>().map_err(|_| invalid())?;
            let day = caps[3].parse::<u32>().map_err(|_| invalid())?;
            NaiveDate::from_ymd_opt(year, month, day)
                .map(Value::Date)
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

/// Converts an ISO 8601 timestamp without offset to a UTC time.
///
/// The time part is optional and may be truncated at any component;
/// fractional seconds are accepted and dropped.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use input_sanitizer::{converters, Value};
///
/// let expected = Utc.with_ymd_and_hms(2012, 5, 15, 13, 42, 54).unwrap();
/// assert_eq!(
///     converters::time(&Value::from("2012-05-15T13:42:54.000Z")),
///     Ok(Value::Time(expected))
/// );
/// assert!(converters::time(&Value::from("2012-05-15 13:42:54 +01:00")).is_err());
/// ```
pub fn time(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::Time(t) => Ok(Value::Time(*t)),
        Value::String(s) => parse_timestamp(s)
            .map(Value::Time)
            .ok_or_else(|| ConversionError::new("invalid time")),
        _ => Err(ConversionError::new("invalid time")),
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let caps = TIMESTAMP.captures(s)?;
    let component = |i: usize| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    let year = caps[1].parse::<i32>().ok()?;
    Utc.with_ymd_and_hms(
        year,
        component(2)?,
        component(3)?,
        component(4)?,
        component(5)?,
        component(6)?,
    )
    .single()
}

/// Converts boolean literals.
///
/// `true`, `"true"`, `"True"`, `"1"`, `"yes"` and `1` are true; `false`,
/// `"false"`, `"False"`, `"0"`, `"no"` and `0` are false. Anything else is an
/// error whose message lists the accepted literals.
pub fn boolean(value: &Value) -> Result<Value, ConversionError> {
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Integer(1) => Some(true),
        Value::Integer(0) => Some(false),
        Value::String(s) if TRUE_LITERALS.contains(&s.as_str()) => Some(true),
        Value::String(s) if FALSE_LITERALS.contains(&s.as_str()) => Some(false),
        _ => None,
    };
    parsed.map(Value::Bool).ok_or_else(|| {
        let quote = |literals: &[&str]| {
            literals
                .iter()
                .map(|l| format!("'{}'", l))
                .collect::<Vec<_>>()
                .join(", ")
        };
        ConversionError::new(format!(
            "Invalid boolean: use {} for true, or {} for false.",
            quote(&TRUE_LITERALS[..]),
            quote(&FALSE_LITERALS[..])
        ))
    })
}

/// Splits `"1,2,3"` into a list of integers.
pub fn comma_joined_integers(value: &Value) -> Result<Value, ConversionError> {
    let invalid = || ConversionError::new("invalid integers");
    let text = value.to_string();
    if !COMMA_JOINED_INTEGERS.is_match(&text) {
        return Err(invalid());
    }
    text.split(',')
        .map(|part| part.parse::<i64>().map(Value::Integer).map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

/// Splits `"a,B,c"` into a list of strings made of ASCII word characters and `-`.
pub fn comma_joined_strings(value: &Value) -> Result<Value, ConversionError> {
    let text = value.to_string();
    if !COMMA_JOINED_STRINGS.is_match(&text) {
        return Err(ConversionError::new("invalid strings"));
    }
    Ok(Value::List(text.split(',').map(Value::from).collect()))
}

/// Accepts only one of `allowed`, compared on the string form of the input.
pub fn specific_values(value: &Value, allowed: &[String]) -> Result<Value, ConversionError> {
    let text = value.to_string();
    if allowed.iter().any(|candidate| *candidate == text) {
        Ok(Value::String(text))
    } else {
        Err(ConversionError::new(format!(
            "possible values are: {}",
            allowed.join(", ")
        )))
    }
}
