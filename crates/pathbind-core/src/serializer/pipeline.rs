//! Serialization pipeline implementation
//!
//! Copyright (c) 2025 Pathbind Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::record::{FieldValue, Record};
use crate::schema::FieldDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Extra output options for [`dump_with`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpOptions {
    /// Drop fields whose output value is `null`, at every nesting level
    #[serde(default)]
    pub exclude_none: bool,
    /// Additional top-level field names to hide
    #[serde(default)]
    pub exclude: HashSet<String>,
}

impl DumpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude_none(mut self, exclude_none: bool) -> Self {
        self.exclude_none = exclude_none;
        self
    }

    pub fn exclude(mut self, field: impl Into<String>) -> Self {
        self.exclude.insert(field.into());
        self
    }

    // Nested records inherit null handling but not top-level exclusions.
    fn nested(&self) -> Self {
        Self {
            exclude_none: self.exclude_none,
            exclude: HashSet::new(),
        }
    }
}

/// Structured mapping of every visible field
pub fn dump(record: &Record) -> Result<Map<String, Value>> {
    dump_with(record, &DumpOptions::default())
}

/// Structured mapping with extra output options
#[tracing::instrument(level = "debug", skip_all, fields(record = %record.schema().name()))]
pub fn dump_with(record: &Record, options: &DumpOptions) -> Result<Map<String, Value>> {
    let mut output = Map::new();

    for (field, value) in record.fields() {
        if field.is_excluded() || options.exclude.contains(field.name()) {
            continue;
        }

        let normalized = normalize(value, options)?;
        if options.exclude_none && normalized.is_null() {
            continue;
        }

        let value = apply_serializer(field, normalized)?;
        output.insert(field.name().to_string(), value);
    }

    for (field, derivation) in record.schema().computed_fields() {
        if field.is_excluded() || options.exclude.contains(field.name()) {
            continue;
        }

        let value = derivation.derive(record);
        if options.exclude_none && value.is_null() {
            continue;
        }
        output.insert(field.name().to_string(), value);
    }

    log::debug!(
        "Dumped record '{}' with {} fields",
        record.schema().name(),
        output.len()
    );
    Ok(output)
}

/// Compact JSON text
pub fn dump_json(record: &Record) -> Result<String> {
    Ok(serde_json::to_string(&dump(record)?)?)
}

/// Indented JSON text
pub fn dump_json_pretty(record: &Record) -> Result<String> {
    Ok(serde_json::to_string_pretty(&dump(record)?)?)
}

/// Space-joined `name=value` tokens in output order
pub fn dump_display(record: &Record) -> Result<String> {
    Ok(display_mapping(&dump(record)?))
}

/// Display text of an already dumped mapping
pub fn display_mapping(mapping: &Map<String, Value>) -> String {
    let tokens: Vec<String> = mapping
        .iter()
        .map(|(name, value)| format!("{}={}", name, display_value(value)))
        .collect();
    tokens.join(" ")
}

/// Display text of one value
///
/// String leaves are single-quoted at any depth, with `\` and `'` escaped.
/// Containers use compact JSON punctuation around their displayed items.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(display_value).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{}:{}", quote(key), display_value(value)))
                .collect();
            format!("{{{}}}", entries.join(","))
        }
        other => other.to_string(),
    }
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for c in text.chars() {
        if c == '\\' || c == '\'' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

/// Convert a field value into plain output data
fn normalize(value: &FieldValue, options: &DumpOptions) -> Result<Value> {
    match value {
        FieldValue::Value(value) => Ok(value.clone()),
        FieldValue::Record(record) => Ok(Value::Object(dump_with(record, &options.nested())?)),
        FieldValue::List(items) => items
            .iter()
            .map(|item| normalize(item, options))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        FieldValue::Map(entries) => entries
            .iter()
            .map(|(key, item)| Ok((key.clone(), normalize(item, options)?)))
            .collect::<Result<Map<String, Value>>>()
            .map(Value::Object),
    }
}

fn apply_serializer(field: &FieldDescriptor, value: Value) -> Result<Value> {
    let Some(serializer) = field.serializer() else {
        return Ok(value);
    };
    if value.is_null() {
        return Ok(value);
    }

    serializer.apply(&value).map_err(|source| {
        log::warn!(
            "Serializer '{}' failed for field '{}': {}",
            serializer.name(),
            field.name(),
            source
        );
        Error::Serialization {
            field: field.name().to_string(),
            source,
        }
    })
}
