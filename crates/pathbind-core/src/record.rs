//! Record instances
//!
//! A record owns one value per bound field of its schema; nested records are
//! owned recursively. Records are created by the binder or by
//! [`RecordBuilder`] and never change once built.

use crate::binder::Binder;
use crate::coercion::Coercer;
use crate::error::{Error, Result};
use crate::schema::{FieldDescriptor, RecordSchema};
use crate::serializer::{self, DumpOptions};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Typed value held by a record field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A plain JSON value (including `null` for absent fields)
    Value(Value),
    /// A nested record
    Record(Box<Record>),
    /// A list of nested records (or `null` placeholders)
    List(Vec<FieldValue>),
    /// A string-keyed map of nested records, in document order
    Map(Vec<(String, FieldValue)>),
}

impl FieldValue {
    pub fn null() -> Self {
        FieldValue::Value(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Value(Value::Null))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Number of elements for lists, arrays, maps and objects
    pub fn len(&self) -> Option<usize> {
        match self {
            FieldValue::Value(Value::Array(items)) => Some(items.len()),
            FieldValue::Value(Value::Object(map)) => Some(map.len()),
            FieldValue::List(items) => Some(items.len()),
            FieldValue::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Value(value)
    }
}

impl From<Record> for FieldValue {
    fn from(record: Record) -> Self {
        FieldValue::Record(Box::new(record))
    }
}

impl From<Vec<Record>> for FieldValue {
    fn from(records: Vec<Record>) -> Self {
        FieldValue::List(records.into_iter().map(FieldValue::from).collect())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Value(Value::from(value))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Value(Value::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Value(Value::from(value))
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Value(Value::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Value(Value::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Value(Value::from(value))
    }
}

/// A populated instance of a record schema
#[derive(Clone)]
pub struct Record {
    schema: Arc<RecordSchema>,
    // One slot per declared field; computed slots stay null and are never read.
    values: Vec<FieldValue>,
}

impl Record {
    pub(crate) fn from_parts(schema: Arc<RecordSchema>, values: Vec<FieldValue>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self { schema, values }
    }

    /// Bind a document with the default lax coercion
    pub fn bind(schema: &Arc<RecordSchema>, document: &Value) -> Result<Self> {
        Binder::new().bind(document, schema)
    }

    /// Build a record directly from typed values
    pub fn builder(schema: &Arc<RecordSchema>) -> RecordBuilder {
        RecordBuilder::new(schema)
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Value of a bound field; `None` for computed or unknown fields
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        let index = self.schema.index_of(name)?;
        if self.schema.fields()[index].is_computed() {
            return None;
        }
        self.values.get(index)
    }

    /// Plain value of a bound field
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(FieldValue::as_value)
    }

    /// Nested record held by a bound field
    pub fn record(&self, name: &str) -> Option<&Record> {
        self.get(name).and_then(FieldValue::as_record)
    }

    /// Freshly derived value of a computed field
    pub fn computed(&self, name: &str) -> Option<Value> {
        self.schema
            .computed_fields()
            .find(|(field, _)| field.name() == name)
            .map(|(_, derivation)| derivation.derive(self))
    }

    /// Bound fields and their values in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &FieldValue)> {
        self.schema
            .fields()
            .iter()
            .zip(self.values.iter())
            .filter(|(field, _)| !field.is_computed())
    }

    /// Structured mapping of every visible field
    pub fn dump(&self) -> Result<Map<String, Value>> {
        serializer::dump(self)
    }

    /// Structured mapping with extra output options
    pub fn dump_with(&self, options: &DumpOptions) -> Result<Map<String, Value>> {
        serializer::dump_with(self, options)
    }

    /// Compact JSON text
    pub fn dump_json(&self) -> Result<String> {
        serializer::dump_json(self)
    }

    /// Indented JSON text
    pub fn dump_json_pretty(&self) -> Result<String> {
        serializer::dump_json_pretty(self)
    }

    /// Space-joined `name=value` text
    pub fn dump_display(&self) -> Result<String> {
        serializer::dump_display(self)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.schema, &other.schema) || self.schema.name() == other.schema.name())
            && self.values == other.values
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.schema.name());
        for (field, value) in self.fields() {
            out.field(field.name(), value);
        }
        out.finish()
    }
}

/// Builder for records constructed from already typed values.
///
/// Plain values still pass through the coercion layer; fields that are not
/// set are treated as absent.
pub struct RecordBuilder {
    schema: Arc<RecordSchema>,
    values: Vec<Option<FieldValue>>,
    binder: Binder,
    unknown: Option<String>,
}

impl RecordBuilder {
    /// Create a builder for the schema
    pub fn new(schema: &Arc<RecordSchema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            values: vec![None; schema.len()],
            binder: Binder::new(),
            unknown: None,
        }
    }

    /// Use a custom coercion layer
    pub fn coercer(mut self, coercer: Arc<dyn Coercer>) -> Self {
        self.binder = Binder::with_coercer(coercer);
        self
    }

    /// Set a bound field
    pub fn set(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        match self.schema.index_of(name) {
            Some(index) if !self.schema.fields()[index].is_computed() => {
                self.values[index] = Some(value.into());
            }
            _ => {
                if self.unknown.is_none() {
                    self.unknown = Some(name.to_string());
                }
            }
        }
        self
    }

    /// Validate the values and build the record
    pub fn build(self) -> Result<Record> {
        if let Some(field) = self.unknown {
            return Err(Error::UnknownField {
                record: self.schema.name().to_string(),
                field,
            });
        }

        let mut values = Vec::with_capacity(self.values.len());
        for (field, slot) in self.schema.fields().iter().zip(self.values) {
            let value = if field.is_computed() {
                FieldValue::null()
            } else {
                self.binder.accept(field, slot.unwrap_or_else(FieldValue::null))?
            };
            values.push(value);
        }

        Ok(Record::from_parts(self.schema, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldBuilder, ValueType};
    use serde_json::json;

    fn user_schema() -> Arc<RecordSchema> {
        RecordSchema::builder("User")
            .field(FieldBuilder::scalar("id", ValueType::Integer).required())
            .field(FieldBuilder::scalar("name", ValueType::String))
            .computed("tag", |r| json!(format!("user-{}", r.value("id").unwrap_or(&Value::Null))))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_sets_and_defaults() {
        let schema = user_schema();
        let user = Record::builder(&schema).set("id", 1).build().unwrap();

        assert_eq!(user.value("id"), Some(&json!(1)));
        assert_eq!(user.value("name"), Some(&Value::Null));
        assert!(user.get("tag").is_none());
        assert_eq!(user.computed("tag"), Some(json!("user-1")));
    }

    #[test]
    fn test_builder_rejects_unknown_and_computed_fields() {
        let schema = user_schema();

        let err = Record::builder(&schema).set("id", 1).set("email", "x").build().unwrap_err();
        assert!(matches!(err, Error::UnknownField { ref field, .. } if field == "email"));

        let err = Record::builder(&schema).set("id", 1).set("tag", "x").build().unwrap_err();
        assert!(matches!(err, Error::UnknownField { .. }));
    }

    #[test]
    fn test_builder_runs_coercion() {
        let schema = user_schema();

        let user = Record::builder(&schema).set("id", "42").build().unwrap();
        assert_eq!(user.value("id"), Some(&json!(42)));

        let err = Record::builder(&schema).set("name", "ada").build().unwrap_err();
        assert_eq!(err.field(), Some("id"));
    }

    #[test]
    fn test_fields_iterate_bound_only() {
        let schema = user_schema();
        let user = Record::builder(&schema).set("id", 7).set("name", "ada").build().unwrap();

        let names: Vec<_> = user.fields().map(|(f, _)| f.name()).collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn test_field_value_helpers() {
        assert!(FieldValue::null().is_null());
        assert_eq!(FieldValue::from(json!([1, 2])).len(), Some(2));
        assert_eq!(FieldValue::from("x").len(), None);
    }
}
