//! Built-in serializers and derivations
//!
//! Ready-made [`FieldSerializer`]s for common output transforms, and
//! [`Derivation`]s for common computed fields. Schema documents refer to the
//! serializers by spec strings such as `uppercase` or `round:2`.
//!
//! Copyright (c) 2025 Pathbind Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result, SerializerError};
use crate::record::{FieldValue, Record};
use crate::schema::{Derivation, FieldSerializer};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};

/// Names accepted by [`by_spec`]
pub const SERIALIZER_NAMES: &[&str] = &[
    "uppercase",
    "lowercase",
    "trim",
    "to_string",
    "increment",
    "round",
    "join",
    "rfc3339",
];

/// Resolve a `name[:argument]` serializer spec
pub fn by_spec(spec: &str) -> Result<FieldSerializer> {
    let (name, argument) = match spec.split_once(':') {
        Some((name, argument)) => (name.trim(), Some(argument)),
        None => (spec.trim(), None),
    };

    let no_argument = |serializer: FieldSerializer| match argument {
        None => Ok(serializer),
        Some(_) => Err(Error::schema(
            format!("serializer '{}' takes no argument", name),
            None,
        )),
    };

    match name {
        "uppercase" => no_argument(uppercase()),
        "lowercase" => no_argument(lowercase()),
        "trim" => no_argument(trim()),
        "to_string" => no_argument(to_string()),
        "rfc3339" => no_argument(rfc3339()),
        "increment" => {
            let by = match argument {
                Some(text) => text.trim().parse::<i64>().map_err(|_| {
                    Error::schema(format!("increment step '{}' is not an integer", text), None)
                })?,
                None => 1,
            };
            Ok(increment(by))
        }
        "round" => {
            let digits = match argument {
                Some(text) => text.trim().parse::<u32>().map_err(|_| {
                    Error::schema(format!("round digits '{}' is not a count", text), None)
                })?,
                None => 0,
            };
            Ok(round(digits))
        }
        "join" => Ok(join(argument.unwrap_or(", "))),
        other => Err(Error::schema(
            format!(
                "unknown serializer '{}' (expected one of: {})",
                other,
                SERIALIZER_NAMES.join(", ")
            ),
            None,
        )),
    }
}

/// Apply a text transform to a string or to every string in an array
fn map_text(
    value: &Value,
    transform: impl Fn(&str) -> String,
) -> std::result::Result<Value, SerializerError> {
    match value {
        Value::String(s) => Ok(Value::String(transform(s))),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(Value::String(transform(s))),
                Value::Null => Ok(Value::Null),
                other => Err(SerializerError::type_mismatch("string", other)),
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Err(SerializerError::type_mismatch("string", other)),
    }
}

/// Upper-case text
pub fn uppercase() -> FieldSerializer {
    FieldSerializer::new("uppercase", |value| map_text(value, str::to_uppercase))
}

/// Lower-case text
pub fn lowercase() -> FieldSerializer {
    FieldSerializer::new("lowercase", |value| map_text(value, str::to_lowercase))
}

/// Strip surrounding whitespace
pub fn trim() -> FieldSerializer {
    FieldSerializer::new("trim", |value| map_text(value, |s| s.trim().to_string()))
}

/// Render any value as text; strings are kept as they are
pub fn to_string() -> FieldSerializer {
    FieldSerializer::new("to_string", |value| {
        Ok(match value {
            Value::String(_) => value.clone(),
            other => Value::String(other.to_string()),
        })
    })
}

/// Add a fixed step to a number
pub fn increment(by: i64) -> FieldSerializer {
    FieldSerializer::new("increment", move |value| match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.checked_add(by)
                    .map(Value::from)
                    .ok_or_else(|| SerializerError::invalid("integer overflow", value))
            } else {
                let f = n.as_f64().unwrap_or_default() + by as f64;
                Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| SerializerError::invalid("result is not finite", value))
            }
        }
        other => Err(SerializerError::type_mismatch("number", other)),
    })
}

/// Round a float to a number of decimal places; integers pass through
pub fn round(digits: u32) -> FieldSerializer {
    FieldSerializer::new("round", move |value| match value {
        Value::Number(n) if n.is_f64() => {
            let factor = 10f64.powi(digits as i32);
            let rounded = (n.as_f64().unwrap_or_default() * factor).round() / factor;
            Number::from_f64(rounded)
                .map(Value::Number)
                .ok_or_else(|| SerializerError::invalid("result is not finite", value))
        }
        Value::Number(_) => Ok(value.clone()),
        other => Err(SerializerError::type_mismatch("number", other)),
    })
}

/// Join the elements of a sequence into one string
pub fn join(separator: impl Into<String>) -> FieldSerializer {
    let separator = separator.into();
    FieldSerializer::new("join", move |value| match value {
        Value::Array(items) => Ok(Value::String(
            items.iter().map(text_of).collect::<Vec<_>>().join(&separator),
        )),
        other => Err(SerializerError::type_mismatch("array", other)),
    })
}

/// Format unix seconds as RFC 3339 UTC text
pub fn rfc3339() -> FieldSerializer {
    FieldSerializer::new("rfc3339", |value| {
        let Value::Number(n) = value else {
            return Err(SerializerError::type_mismatch("unix timestamp", value));
        };

        let timestamp = match n.as_i64() {
            Some(secs) => DateTime::<Utc>::from_timestamp(secs, 0),
            None => {
                let f = n.as_f64().unwrap_or_default();
                let secs = f.floor();
                let nanos = ((f - secs) * 1e9).round() as u32;
                DateTime::<Utc>::from_timestamp(secs as i64, nanos.min(999_999_999))
            }
        };

        timestamp
            .map(|t| Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
            .ok_or_else(|| SerializerError::invalid("timestamp out of range", value))
    })
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Join the text of several fields, skipping null and non-plain values
pub fn concat(fields: Vec<String>, separator: impl Into<String>) -> Derivation {
    let separator = separator.into();
    Derivation::new("concat", move |record: &Record| {
        let parts: Vec<String> = fields
            .iter()
            .filter_map(|name| record.value(name))
            .filter(|value| !value.is_null())
            .map(text_of)
            .collect();
        Value::String(parts.join(&separator))
    })
}

/// Number of elements held by a field; zero for null or scalar values
pub fn count(field: impl Into<String>) -> Derivation {
    let field = field.into();
    Derivation::new("count", move |record: &Record| {
        Value::from(record.get(&field).and_then(FieldValue::len).unwrap_or(0))
    })
}

/// Sum of the numbers held by a field.
///
/// Integer inputs produce an integer; any float makes the result a float.
/// Non-numeric elements are ignored.
pub fn sum(field: impl Into<String>) -> Derivation {
    let field = field.into();
    Derivation::new("sum", move |record: &Record| {
        let numbers: Vec<&Number> = match record.value(&field) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::Number(n) => Some(n),
                    _ => None,
                })
                .collect(),
            Some(Value::Number(n)) => vec![n],
            _ => Vec::new(),
        };

        if numbers.iter().all(|n| n.is_i64()) {
            let total = numbers.iter().filter_map(|n| n.as_i64()).fold(0i64, i64::saturating_add);
            Value::from(total)
        } else {
            let total: f64 = numbers.iter().filter_map(|n| n.as_f64()).sum();
            Number::from_f64(total).map(Value::Number).unwrap_or(Value::Null)
        }
    })
}
