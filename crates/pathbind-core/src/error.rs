//! Error types for the pathbind core library
//!
//! This module defines the error handling system for binding and
//! serialization, using thiserror for ergonomic error definitions and
//! anyhow for caller-supplied serializer failures.

use crate::path::PathError;
use serde_json::Value;
use thiserror::Error;

/// Main error type for pathbind operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid record schema declaration
    #[error("Schema error: {message}")]
    Schema {
        message: String,
        record: Option<String>,
    },

    /// Path expression could not be parsed
    #[error("Path error: {source}")]
    Path {
        #[from]
        source: PathError,
    },

    /// A raw value was rejected by the coercion layer
    #[error("Validation error: {field} - {message}")]
    Validation {
        field: String,
        message: String,
        expected: Option<String>,
    },

    /// A nested record or element failed to bind
    #[error("Binding failed for field '{field}': {source}")]
    Binding {
        field: String,
        #[source]
        source: Box<Error>,
    },

    /// A custom field serializer failed; the whole dump is aborted
    #[error("Serialization failed for field '{field}': {source}")]
    Serialization {
        field: String,
        #[source]
        source: SerializerError,
    },

    /// A field name that the record schema does not declare
    #[error("Unknown field '{field}' on record '{record}'")]
    UnknownField { record: String, field: String },

    /// JSON encoding errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a schema error
    pub fn schema(message: impl Into<String>, record: Option<&str>) -> Self {
        Self::Schema {
            message: message.into(),
            record: record.map(str::to_string),
        }
    }

    /// Create a validation error for a field
    pub fn validation(
        field: impl Into<String>,
        message: impl Into<String>,
        expected: Option<&str>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
            expected: expected.map(str::to_string),
        }
    }

    /// Wrap an error raised while binding the contents of `field`
    pub fn binding(field: impl Into<String>, source: Error) -> Self {
        Self::Binding {
            field: field.into(),
            source: Box::new(source),
        }
    }

    /// Name of the top-level field this error is about, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. }
            | Self::Binding { field, .. }
            | Self::Serialization { field, .. }
            | Self::UnknownField { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Dotted path from the outermost field down to the innermost failure
    ///
    /// `Binding` errors nest one level per record; the innermost field name
    /// comes last.
    pub fn field_path(&self) -> Option<String> {
        match self {
            Self::Binding { field, source } => match source.field_path() {
                Some(inner) => Some(format!("{}.{}", field, inner)),
                None => Some(field.clone()),
            },
            other => other.field().map(str::to_string),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Failure returned by a field serializer
#[derive(Error, Debug)]
pub enum SerializerError {
    /// The serializer does not accept values of this kind
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// The value has the right kind but cannot be converted
    #[error("invalid value {value}: {message}")]
    Invalid { message: String, value: Value },

    /// Any other failure raised by a custom serializer
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SerializerError {
    /// Create a type mismatch error describing the offending value
    pub fn type_mismatch(expected: impl Into<String>, found: &Value) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: kind_name(found).to_string(),
        }
    }

    /// Create an invalid value error
    pub fn invalid(message: impl Into<String>, value: &Value) -> Self {
        Self::Invalid {
            message: message.into(),
            value: value.clone(),
        }
    }
}

/// Short name of a JSON value's kind, used in error messages
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
