//! Builders for declaring record schemas
//!
//! This module provides a fluent builder API for constructing record schemas
//! with validation of field names and alias paths at build time.
//!
//! Copyright (c) 2025 Pathbind Team
//! Licensed under the Apache-2.0 license

use super::types::{
    Derivation, ElementType, FieldDescriptor, FieldKind, FieldSerializer, RecordSchema, ValueType,
};
use crate::error::{Error, Result};
use crate::path::PathExpression;
use crate::record::Record;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

static IDENTIFIER_REGEX: OnceLock<Regex> = OnceLock::new();

/// Whether `name` is a valid field or record identifier
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"))
        .is_match(name)
}

/// Builder for a single bound field
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    name: String,
    alias: Option<String>,
    kind: FieldKind,
    exclude: bool,
    required: bool,
    default: Option<Value>,
    serializer: Option<FieldSerializer>,
}

impl FieldBuilder {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            alias: None,
            kind,
            exclude: false,
            required: false,
            default: None,
            serializer: None,
        }
    }

    /// A single plain value
    pub fn scalar(name: impl Into<String>, ty: ValueType) -> Self {
        Self::new(name, FieldKind::Scalar(ty))
    }

    /// A list of plain values
    pub fn sequence(name: impl Into<String>, ty: ValueType) -> Self {
        Self::new(name, FieldKind::Sequence(ElementType::Value(ty)))
    }

    /// A list of nested records
    pub fn records(name: impl Into<String>, schema: &Arc<RecordSchema>) -> Self {
        Self::new(name, FieldKind::Sequence(ElementType::Record(Arc::clone(schema))))
    }

    /// A nested record
    pub fn record(name: impl Into<String>, schema: &Arc<RecordSchema>) -> Self {
        Self::new(name, FieldKind::Record(Arc::clone(schema)))
    }

    /// A string-keyed map of values or records
    pub fn mapping(name: impl Into<String>, element: ElementType) -> Self {
        Self::new(name, FieldKind::Mapping(element))
    }

    /// Bind from this path instead of the field name
    pub fn alias(mut self, path: impl Into<String>) -> Self {
        self.alias = Some(path.into());
        self
    }

    /// Hide the field from every output form
    pub fn exclude(mut self) -> Self {
        self.exclude = true;
        self
    }

    /// Reject records where the field binds to nothing
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Substitute this value when the field binds to nothing
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Transform the field's value on output
    pub fn serializer(mut self, serializer: FieldSerializer) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Shorthand for a closure serializer
    pub fn serialize_with<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<Value, crate::error::SerializerError>
            + Send
            + Sync
            + 'static,
    {
        self.serializer(FieldSerializer::new(name, func))
    }

    fn build(self, record: &str) -> Result<FieldDescriptor> {
        let alias = match &self.alias {
            Some(path) => PathExpression::parse(path).map_err(|e| {
                Error::schema(
                    format!("invalid alias '{}' for field '{}': {}", path, self.name, e),
                    Some(record),
                )
            })?,
            None => PathExpression::key(&self.name),
        };

        Ok(FieldDescriptor {
            name: self.name,
            alias,
            kind: self.kind,
            exclude: self.exclude,
            required: self.required,
            default: self.default,
            serializer: self.serializer,
        })
    }
}

/// Builder for a record schema
pub struct RecordSchemaBuilder {
    name: String,
    fields: Vec<FieldDescriptorSpec>,
}

enum FieldDescriptorSpec {
    Bound(FieldBuilder),
    Computed {
        name: String,
        derivation: Derivation,
        exclude: bool,
    },
}

impl FieldDescriptorSpec {
    fn name(&self) -> &str {
        match self {
            FieldDescriptorSpec::Bound(field) => &field.name,
            FieldDescriptorSpec::Computed { name, .. } => name,
        }
    }
}

impl RecordSchemaBuilder {
    /// Create a new schema builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Declare the next bound field
    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.fields.push(FieldDescriptorSpec::Bound(field));
        self
    }

    /// Declare a computed field derived from the record at output time
    pub fn computed<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        self.derived(name, Derivation::new("custom", func))
    }

    /// Declare a computed field that is derived but never output
    pub fn computed_hidden<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        self.derived_hidden(name, Derivation::new("custom", func))
    }

    /// Declare a computed field from a prepared derivation
    pub fn derived(mut self, name: impl Into<String>, derivation: Derivation) -> Self {
        self.fields.push(FieldDescriptorSpec::Computed {
            name: name.into(),
            derivation,
            exclude: false,
        });
        self
    }

    /// Declare a computed field that is hidden from output
    pub fn derived_hidden(mut self, name: impl Into<String>, derivation: Derivation) -> Self {
        self.fields.push(FieldDescriptorSpec::Computed {
            name: name.into(),
            derivation,
            exclude: true,
        });
        self
    }

    /// Validate the declarations and freeze the field table
    pub fn build(self) -> Result<Arc<RecordSchema>> {
        if !is_identifier(&self.name) {
            return Err(Error::schema(
                format!("record name '{}' is not an identifier", self.name),
                None,
            ));
        }

        let mut index = HashMap::with_capacity(self.fields.len());
        let mut fields = Vec::with_capacity(self.fields.len());

        for spec in self.fields {
            let name = spec.name().to_string();
            if !is_identifier(&name) {
                return Err(Error::schema(
                    format!("field name '{}' is not an identifier", name),
                    Some(&self.name),
                ));
            }
            if index.contains_key(&name) {
                return Err(Error::schema(
                    format!("field '{}' is declared more than once", name),
                    Some(&self.name),
                ));
            }

            let descriptor = match spec {
                FieldDescriptorSpec::Bound(field) => field.build(&self.name)?,
                FieldDescriptorSpec::Computed {
                    derivation,
                    exclude,
                    ..
                } => FieldDescriptor {
                    alias: PathExpression::key(&name),
                    name: name.clone(),
                    kind: FieldKind::Computed(derivation),
                    exclude,
                    required: false,
                    default: None,
                    serializer: None,
                },
            };

            index.insert(name, fields.len());
            fields.push(descriptor);
        }

        log::debug!("Declared record schema '{}' with {} fields", self.name, fields.len());

        Ok(Arc::new(RecordSchema {
            name: self.name,
            fields,
            index,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alias_defaults_to_field_name() {
        let schema = RecordSchema::builder("User")
            .field(FieldBuilder::scalar("id", ValueType::Integer))
            .build()
            .unwrap();

        let id = schema.field("id").unwrap();
        assert!(id.alias().is_simple_key());
        assert_eq!(id.alias().as_str(), "id");
    }

    #[test]
    fn test_declaration_order_is_preserved() {
        let schema = RecordSchema::builder("Order")
            .field(FieldBuilder::scalar("zeta", ValueType::Any))
            .computed("label", |_| json!("x"))
            .field(FieldBuilder::scalar("alpha", ValueType::Any))
            .build()
            .unwrap();

        let names: Vec<_> = schema.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["zeta", "label", "alpha"]);
        assert_eq!(schema.index_of("alpha"), Some(2));
        assert_eq!(schema.bound_fields().count(), 2);
        assert_eq!(schema.computed_fields().count(), 1);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = RecordSchema::builder("User")
            .field(FieldBuilder::scalar("id", ValueType::Integer))
            .computed("id", |_| json!(1))
            .build();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_bad_alias_rejected() {
        let result = RecordSchema::builder("User")
            .field(FieldBuilder::scalar("id", ValueType::Integer).alias("user..id"))
            .build();

        assert!(matches!(result, Err(Error::Schema { .. })));
    }

    #[test]
    fn test_identifiers_validated() {
        assert!(is_identifier("user_id2"));
        assert!(!is_identifier("2user"));
        assert!(!is_identifier("user-id"));

        let result = RecordSchema::builder("User")
            .field(FieldBuilder::scalar("first name", ValueType::String))
            .build();
        assert!(result.is_err());

        assert!(RecordSchema::builder("Bad Name").build().is_err());
    }

    #[test]
    fn test_kind_labels() {
        let user = RecordSchema::builder("User").build().unwrap();
        let schema = RecordSchema::builder("Team")
            .field(FieldBuilder::records("members", &user))
            .field(FieldBuilder::sequence("tags", ValueType::String))
            .field(FieldBuilder::mapping("scores", ElementType::Value(ValueType::Float)))
            .build()
            .unwrap();

        assert_eq!(schema.field("members").unwrap().kind().label(), "list[User]");
        assert_eq!(schema.field("tags").unwrap().kind().label(), "list[string]");
        assert_eq!(schema.field("scores").unwrap().kind().label(), "map[float]");
    }
}
