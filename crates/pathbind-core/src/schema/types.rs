//! Core types for record schemas
//!
//! A schema is an ordered table of field descriptors built once per record
//! type. Descriptors are immutable after construction and the table is shared
//! read-only through `Arc`.
//!
//! Copyright (c) 2025 Pathbind Team
//! Licensed under the Apache-2.0 license

use super::builder::RecordSchemaBuilder;
use crate::error::SerializerError;
use crate::path::PathExpression;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Declared type of a plain value, consulted by the coercion layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Accept any JSON value unchanged
    #[default]
    Any,
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Object,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Any => "any",
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
            ValueType::Array => "array",
            ValueType::Object => "object",
        };
        f.write_str(name)
    }
}

/// Element type of sequence and mapping fields
#[derive(Debug, Clone)]
pub enum ElementType {
    /// Plain values of a declared type
    Value(ValueType),
    /// Nested records bound against another schema
    Record(Arc<RecordSchema>),
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Value(ty) => write!(f, "{}", ty),
            ElementType::Record(schema) => write!(f, "{}", schema.name()),
        }
    }
}

/// Signature of a field serializer
pub type SerializerFn = Arc<dyn Fn(&Value) -> Result<Value, SerializerError> + Send + Sync>;

/// Signature of a computed-field derivation
pub type DerivationFn = Arc<dyn Fn(&Record) -> Value + Send + Sync>;

/// Named custom transform applied to a field's normalized value on output
#[derive(Clone)]
pub struct FieldSerializer {
    name: String,
    func: SerializerFn,
}

impl FieldSerializer {
    /// Wrap a closure as a serializer
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, SerializerError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Serializer name, used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the serializer
    pub fn apply(&self, value: &Value) -> Result<Value, SerializerError> {
        (self.func)(value)
    }
}

impl fmt::Debug for FieldSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSerializer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Rule deriving a computed field from a record's current state
#[derive(Clone)]
pub struct Derivation {
    name: String,
    func: DerivationFn,
}

impl Derivation {
    /// Wrap a closure as a derivation
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Derivation name, used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Derive the current value
    pub fn derive(&self, record: &Record) -> Value {
        (self.func)(record)
    }
}

impl fmt::Debug for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Derivation")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// What a field holds and how it is bound
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A single plain value
    Scalar(ValueType),
    /// An ordered list of values or records
    Sequence(ElementType),
    /// A string-keyed map of values or records
    Mapping(ElementType),
    /// A nested record
    Record(Arc<RecordSchema>),
    /// Derived on demand; never bound
    Computed(Derivation),
}

impl FieldKind {
    /// Short label for listings
    pub fn label(&self) -> String {
        match self {
            FieldKind::Scalar(ty) => ty.to_string(),
            FieldKind::Sequence(element) => format!("list[{}]", element),
            FieldKind::Mapping(element) => format!("map[{}]", element),
            FieldKind::Record(schema) => schema.name().to_string(),
            FieldKind::Computed(derivation) => format!("computed({})", derivation.name()),
        }
    }
}

/// Static metadata for one declared field
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) alias: PathExpression,
    pub(crate) kind: FieldKind,
    pub(crate) exclude: bool,
    pub(crate) required: bool,
    pub(crate) default: Option<Value>,
    pub(crate) serializer: Option<FieldSerializer>,
}

impl FieldDescriptor {
    /// Field name, used as the output key
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path the field is bound from; the name itself when no alias is set
    pub fn alias(&self) -> &PathExpression {
        &self.alias
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether the field is hidden from every output form
    pub fn is_excluded(&self) -> bool {
        self.exclude
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_computed(&self) -> bool {
        matches!(self.kind, FieldKind::Computed(_))
    }

    /// Value substituted when binding finds nothing
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn serializer(&self) -> Option<&FieldSerializer> {
        self.serializer.as_ref()
    }
}

/// Ordered field table for one record type
#[derive(Debug)]
pub struct RecordSchema {
    pub(crate) name: String,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) index: HashMap<String, usize>,
}

impl RecordSchema {
    /// Start declaring a record type
    pub fn builder(name: impl Into<String>) -> RecordSchemaBuilder {
        RecordSchemaBuilder::new(name)
    }

    /// Record type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All fields in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index_of(name).map(|i| &self.fields[i])
    }

    /// Position of a field in declaration order
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Non-computed fields in declaration order
    pub fn bound_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.is_computed())
    }

    /// Computed fields in declaration order
    pub fn computed_fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &Derivation)> {
        self.fields.iter().filter_map(|f| match &f.kind {
            FieldKind::Computed(derivation) => Some((f, derivation)),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
