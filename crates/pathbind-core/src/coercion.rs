//! Type coercion for bound values
//!
//! The binder hands every raw resolved value to a [`Coercer`], which either
//! returns the typed value or fails with a validation error naming the field.
//! [`TypeCoercion`] is the default implementation; callers with their own
//! validation rules can plug in a different one.

use crate::error::{kind_name, Error, Result};
use crate::schema::{FieldDescriptor, ValueType};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Validation layer consulted by the binder
pub trait Coercer: Send + Sync {
    /// Convert a non-null raw value to the declared type
    fn coerce(&self, field: &FieldDescriptor, ty: ValueType, raw: Value) -> Result<Value>;

    /// Value for a field that bound to nothing
    fn absent(&self, field: &FieldDescriptor) -> Result<Value> {
        if let Some(default) = field.default_value() {
            return Ok(default.clone());
        }
        if field.is_required() {
            return Err(Error::validation(
                field.name(),
                "field required",
                Some(&field.kind().label()),
            ));
        }
        Ok(Value::Null)
    }
}

/// How far the default coercion goes to accept a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionMode {
    /// Convert numeric strings, integral floats and boolean-like text
    #[default]
    Lax,
    /// Accept only values whose JSON kind already matches
    Strict,
}

impl fmt::Display for CoercionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercionMode::Lax => write!(f, "lax"),
            CoercionMode::Strict => write!(f, "strict"),
        }
    }
}

/// Default coercion driven by each field's [`ValueType`]
#[derive(Debug, Clone, Default)]
pub struct TypeCoercion {
    mode: CoercionMode,
}

impl TypeCoercion {
    pub fn new(mode: CoercionMode) -> Self {
        Self { mode }
    }

    pub fn lax() -> Self {
        Self::new(CoercionMode::Lax)
    }

    pub fn strict() -> Self {
        Self::new(CoercionMode::Strict)
    }

    pub fn mode(&self) -> CoercionMode {
        self.mode
    }

    fn to_integer(&self, raw: &Value) -> Option<Value> {
        match raw {
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(raw.clone()),
            Value::Number(n) if self.mode == CoercionMode::Lax => {
                let f = n.as_f64()?;
                // i64::MAX as f64 rounds up to 2^63, which does not fit
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    Some(Value::from(f as i64))
                } else {
                    None
                }
            }
            Value::String(s) if self.mode == CoercionMode::Lax => {
                s.trim().parse::<i64>().ok().map(Value::from)
            }
            _ => None,
        }
    }

    fn to_float(&self, raw: &Value) -> Option<Value> {
        match raw {
            Value::Number(_) => Some(raw.clone()),
            Value::String(s) if self.mode == CoercionMode::Lax => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            _ => None,
        }
    }

    fn to_boolean(&self, raw: &Value) -> Option<Value> {
        match raw {
            Value::Bool(_) => Some(raw.clone()),
            Value::Number(n) if self.mode == CoercionMode::Lax => match n.as_i64() {
                Some(0) => Some(Value::Bool(false)),
                Some(1) => Some(Value::Bool(true)),
                _ => None,
            },
            Value::String(s) if self.mode == CoercionMode::Lax => {
                match s.trim().to_lowercase().as_str() {
                    "true" | "yes" | "1" | "on" => Some(Value::Bool(true)),
                    "false" | "no" | "0" | "off" => Some(Value::Bool(false)),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl Coercer for TypeCoercion {
    fn coerce(&self, field: &FieldDescriptor, ty: ValueType, raw: Value) -> Result<Value> {
        let converted = match ty {
            ValueType::Any => Some(raw.clone()),
            ValueType::String => raw.is_string().then(|| raw.clone()),
            ValueType::Integer => self.to_integer(&raw),
            ValueType::Float => self.to_float(&raw),
            ValueType::Boolean => self.to_boolean(&raw),
            ValueType::Array => raw.is_array().then(|| raw.clone()),
            ValueType::Object => raw.is_object().then(|| raw.clone()),
        };

        converted.ok_or_else(|| {
            Error::validation(
                field.name(),
                format!("cannot use {} value {} as {}", kind_name(&raw), raw, ty),
                Some(&ty.to_string()),
            )
        })
    }
}
