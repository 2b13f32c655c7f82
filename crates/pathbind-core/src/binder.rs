//! Binding documents onto record schemas
//!
//! Every bound field is resolved through its alias path, reduced to a raw
//! value by the match-selection rules, and handed to the coercion layer.
//! Binding is total: a field either receives a typed value or an explicit
//! absence (`null` or its default). Structural mismatches never fail a bind;
//! only the coercion layer and nested records can.

use crate::coercion::{Coercer, TypeCoercion};
use crate::error::{kind_name, Error, Result};
use crate::record::{FieldValue, Record};
use crate::schema::{ElementType, FieldDescriptor, FieldKind, RecordSchema, ValueType};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Binds documents using a configurable coercion layer
#[derive(Clone)]
pub struct Binder {
    coercer: Arc<dyn Coercer>,
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl Binder {
    /// Binder with lax type coercion
    pub fn new() -> Self {
        Self::with_coercer(Arc::new(TypeCoercion::lax()))
    }

    /// Binder with a custom coercion layer
    pub fn with_coercer(coercer: Arc<dyn Coercer>) -> Self {
        Self { coercer }
    }

    /// Populate a record of `schema` from `document`
    #[tracing::instrument(level = "debug", skip_all, fields(record = %schema.name()))]
    pub fn bind(&self, document: &Value, schema: &Arc<RecordSchema>) -> Result<Record> {
        let mut values = Vec::with_capacity(schema.len());

        for field in schema.fields() {
            let value = match field.kind() {
                FieldKind::Computed(_) => FieldValue::null(),
                _ => {
                    let raw = select_raw(field, document);
                    self.convert(field, raw)?
                }
            };
            values.push(value);
        }

        log::debug!("Bound record '{}'", schema.name());
        Ok(Record::from_parts(Arc::clone(schema), values))
    }

    /// Validate an already typed value for `field`
    pub(crate) fn accept(&self, field: &FieldDescriptor, value: FieldValue) -> Result<FieldValue> {
        match (field.kind(), value) {
            (_, FieldValue::Value(raw)) => self.convert(field, raw),
            (FieldKind::Record(schema), FieldValue::Record(record)) => {
                check_schema(field.name(), schema, &record)?;
                Ok(FieldValue::Record(record))
            }
            (FieldKind::Sequence(element), FieldValue::List(items)) => {
                let items = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let label = format!("{}[{}]", field.name(), i);
                        self.accept_element(field, element, item, label)
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(collect_elements(element, items))
            }
            (FieldKind::Mapping(element), FieldValue::Map(entries)) => {
                let entries = entries
                    .into_iter()
                    .map(|(key, item)| -> Result<(String, FieldValue)> {
                        let label = format!("{}.{}", field.name(), key);
                        Ok((key, self.accept_element(field, element, item, label)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(collect_entries(element, entries))
            }
            (kind, other) => Err(Error::validation(
                field.name(),
                format!("{} cannot be stored in a field of kind {}", describe(&other), kind.label()),
                Some(&kind.label()),
            )),
        }
    }

    fn accept_element(
        &self,
        field: &FieldDescriptor,
        element: &ElementType,
        item: FieldValue,
        label: String,
    ) -> Result<FieldValue> {
        match (element, item) {
            (_, FieldValue::Value(raw)) => self.convert_element(field, element, raw, label),
            (ElementType::Record(schema), FieldValue::Record(record)) => {
                check_schema(&label, schema, &record)?;
                Ok(FieldValue::Record(record))
            }
            (_, other) => Err(Error::validation(
                label,
                format!("{} cannot be stored as {}", describe(&other), element),
                Some(&element.to_string()),
            )),
        }
    }

    /// Convert a raw value into the typed value for `field`
    fn convert(&self, field: &FieldDescriptor, raw: Value) -> Result<FieldValue> {
        if raw.is_null() {
            let substitute = self.coercer.absent(field)?;
            if substitute.is_null() {
                return Ok(FieldValue::null());
            }
            return self.convert_present(field, substitute);
        }
        self.convert_present(field, raw)
    }

    fn convert_present(&self, field: &FieldDescriptor, raw: Value) -> Result<FieldValue> {
        match field.kind() {
            FieldKind::Scalar(ty) => self.coercer.coerce(field, *ty, raw).map(FieldValue::Value),
            FieldKind::Record(schema) => {
                expect_object(field.name(), schema, &raw)?;
                self.bind(&raw, schema)
                    .map(FieldValue::from)
                    .map_err(|e| Error::binding(field.name(), e))
            }
            FieldKind::Sequence(element) => {
                let Value::Array(items) = raw else {
                    return Err(expected(field.name(), "array", &raw));
                };
                let items = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let label = format!("{}[{}]", field.name(), i);
                        self.convert_element(field, element, item, label)
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(collect_elements(element, items))
            }
            FieldKind::Mapping(element) => {
                let Value::Object(map) = raw else {
                    return Err(expected(field.name(), "object", &raw));
                };
                let entries = map
                    .into_iter()
                    .map(|(key, item)| -> Result<(String, FieldValue)> {
                        let label = format!("{}.{}", field.name(), key);
                        Ok((key, self.convert_element(field, element, item, label)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(collect_entries(element, entries))
            }
            FieldKind::Computed(_) => Ok(FieldValue::null()),
        }
    }

    /// Convert one element of a sequence or mapping; errors name `label`
    fn convert_element(
        &self,
        field: &FieldDescriptor,
        element: &ElementType,
        item: Value,
        label: String,
    ) -> Result<FieldValue> {
        match element {
            ElementType::Value(ValueType::Any) => Ok(FieldValue::Value(item)),
            ElementType::Value(ty) => self
                .coercer
                .coerce(field, *ty, item)
                .map(FieldValue::Value)
                .map_err(|e| relabel(e, label)),
            ElementType::Record(_) if item.is_null() => Ok(FieldValue::null()),
            ElementType::Record(schema) => {
                expect_object(&label, schema, &item)?;
                self.bind(&item, schema)
                    .map(FieldValue::from)
                    .map_err(|e| Error::binding(label, e))
            }
        }
    }
}

/// Populate a record with the default binder
pub fn bind(document: &Value, schema: &Arc<RecordSchema>) -> Result<Record> {
    Binder::new().bind(document, schema)
}

/// Reduce a field's path matches to the single raw value to convert.
///
/// Sequence fields take the match list itself, unwrapping it when the only
/// match is already a sequence; every other kind takes the first match. A
/// path that finds nothing yields `null`.
fn select_raw(field: &FieldDescriptor, document: &Value) -> Value {
    let Some(mut matches) = field.alias().find_matches(document) else {
        log::trace!("No match for field '{}' at '{}'", field.name(), field.alias());
        return Value::Null;
    };

    match field.kind() {
        FieldKind::Sequence(_) => {
            if matches.len() == 1 && matches[0].is_array() {
                matches.pop().unwrap_or(Value::Null)
            } else {
                Value::Array(matches)
            }
        }
        _ => matches.into_iter().next().unwrap_or(Value::Null),
    }
}

/// Plain elements stay a JSON array; record elements become a list
fn collect_elements(element: &ElementType, items: Vec<FieldValue>) -> FieldValue {
    match element {
        ElementType::Value(_) => FieldValue::Value(Value::Array(
            items.into_iter().map(into_plain).collect(),
        )),
        ElementType::Record(_) => FieldValue::List(items),
    }
}

/// Plain entries stay a JSON object; record entries become a map
fn collect_entries(element: &ElementType, entries: Vec<(String, FieldValue)>) -> FieldValue {
    match element {
        ElementType::Value(_) => FieldValue::Value(Value::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key, into_plain(value)))
                .collect::<Map<String, Value>>(),
        )),
        ElementType::Record(_) => FieldValue::Map(entries),
    }
}

fn into_plain(value: FieldValue) -> Value {
    match value {
        FieldValue::Value(value) => value,
        // Plain element types never produce records.
        _ => Value::Null,
    }
}

fn describe(value: &FieldValue) -> &'static str {
    match value {
        FieldValue::Value(_) => "a value",
        FieldValue::Record(_) => "a record",
        FieldValue::List(_) => "a list",
        FieldValue::Map(_) => "a map",
    }
}

fn check_schema(label: &str, schema: &RecordSchema, record: &Record) -> Result<()> {
    if record.schema().name() == schema.name() {
        Ok(())
    } else {
        Err(Error::validation(
            label,
            format!("expected record '{}', found '{}'", schema.name(), record.schema().name()),
            Some(schema.name()),
        ))
    }
}

fn expect_object(label: &str, schema: &RecordSchema, raw: &Value) -> Result<()> {
    if raw.is_object() {
        Ok(())
    } else {
        Err(expected(label, &format!("object for record '{}'", schema.name()), raw))
    }
}

/// Point a coercion failure at an element label (`items[2]`, `scores.a`)
fn relabel(err: Error, label: String) -> Error {
    match err {
        Error::Validation {
            message, expected, ..
        } => Error::Validation {
            field: label,
            message,
            expected,
        },
        other => other,
    }
}

fn expected(label: &str, what: &str, raw: &Value) -> Error {
    Error::validation(
        label,
        format!("expected {}, found {}", what, kind_name(raw)),
        Some(what),
    )
}
