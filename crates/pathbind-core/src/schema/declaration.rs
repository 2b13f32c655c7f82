//! Declarative schema documents
//!
//! Schemas can be described as data (JSON or YAML) instead of code. A
//! [`SchemaDocument`] lists record declarations in dependency order and
//! compiles into a [`SchemaSet`] of ready-to-use schemas. Serializers are
//! named with `name[:argument]` specs and resolved through
//! [`built_in::by_spec`](crate::serializer::built_in::by_spec).
//!
//! ```yaml
//! root: User
//! records:
//!   - name: Address
//!     fields:
//!       - { name: city, type: string, serializer: uppercase }
//!   - name: User
//!     fields:
//!       - { name: id, type: integer, required: true }
//!       - { name: address, kind: record, record: Address, alias: profile.address }
//!     computed:
//!       - { name: label, derive: { kind: concat, fields: [id], separator: "-" } }
//! ```
//!
//! Copyright (c) 2025 Pathbind Team
//! Licensed under the Apache-2.0 license

use super::builder::FieldBuilder;
use super::types::{ElementType, RecordSchema, ValueType};
use crate::error::{Error, Result};
use crate::serializer::built_in;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A set of record declarations, loadable with serde
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Record used when no record is named; defaults to the last declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    /// Records in dependency order
    #[serde(default)]
    pub records: Vec<RecordDeclaration>,
}

/// One record type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordDeclaration {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub computed: Vec<ComputedDeclaration>,
}

/// Shape of a bound field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldShape {
    #[default]
    Scalar,
    Sequence,
    Mapping,
    Record,
}

/// One bound field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Value type of the field, or of its elements for sequences and mappings
    #[serde(default, rename = "type")]
    pub value_type: ValueType,
    #[serde(default)]
    pub kind: FieldShape,
    /// Record type for `record` fields and for record elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub exclude: bool,
    /// Serializer spec such as `uppercase` or `increment:1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serializer: Option<String>,
}

/// One computed field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputedDeclaration {
    pub name: String,
    #[serde(default)]
    pub exclude: bool,
    pub derive: DerivationDeclaration,
}

/// Built-in derivation rules available to schema documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DerivationDeclaration {
    /// Join the text of several fields
    Concat {
        fields: Vec<String>,
        #[serde(default = "default_separator")]
        separator: String,
    },
    /// Number of elements held by a field
    Count { field: String },
    /// Sum of the numbers held by a field
    Sum { field: String },
}

fn default_separator() -> String {
    " ".to_string()
}

impl DerivationDeclaration {
    fn referenced_fields(&self) -> Vec<&str> {
        match self {
            DerivationDeclaration::Concat { fields, .. } => {
                fields.iter().map(String::as_str).collect()
            }
            DerivationDeclaration::Count { field } | DerivationDeclaration::Sum { field } => {
                vec![field.as_str()]
            }
        }
    }
}

impl SchemaDocument {
    /// Parse a document from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build every declared record
    pub fn compile(&self) -> Result<SchemaSet> {
        if self.records.is_empty() {
            return Err(Error::schema("schema document declares no records", None));
        }

        let mut set = SchemaSet::default();
        for declaration in &self.records {
            if set.get(&declaration.name).is_some() {
                return Err(Error::schema(
                    format!("record '{}' is declared more than once", declaration.name),
                    Some(&declaration.name),
                ));
            }
            let schema = declaration.compile(&set)?;
            set.insert(schema);
        }

        if let Some(root) = &self.root {
            if set.get(root).is_none() {
                return Err(Error::schema(
                    format!("root record '{}' is not declared", root),
                    None,
                ));
            }
        }
        set.root = self.root.clone();

        log::debug!("Compiled schema document with {} records", set.len());
        Ok(set)
    }
}

impl RecordDeclaration {
    /// Build this record; nested record references resolve against `known`
    pub fn compile(&self, known: &SchemaSet) -> Result<Arc<RecordSchema>> {
        let mut builder = RecordSchema::builder(&self.name);

        for field in &self.fields {
            builder = builder.field(field.to_builder(&self.name, known)?);
        }

        for computed in &self.computed {
            for referenced in computed.derive.referenced_fields() {
                if !self.fields.iter().any(|f| f.name == referenced) {
                    return Err(Error::schema(
                        format!(
                            "computed field '{}' refers to unknown field '{}'",
                            computed.name, referenced
                        ),
                        Some(&self.name),
                    ));
                }
            }

            let derivation = match &computed.derive {
                DerivationDeclaration::Concat { fields, separator } => {
                    built_in::concat(fields.clone(), separator.clone())
                }
                DerivationDeclaration::Count { field } => built_in::count(field.clone()),
                DerivationDeclaration::Sum { field } => built_in::sum(field.clone()),
            };

            builder = if computed.exclude {
                builder.derived_hidden(&computed.name, derivation)
            } else {
                builder.derived(&computed.name, derivation)
            };
        }

        builder.build()
    }
}

impl FieldDeclaration {
    fn to_builder(&self, record: &str, known: &SchemaSet) -> Result<FieldBuilder> {
        let nested = match &self.record {
            Some(name) => Some(known.get(name).cloned().ok_or_else(|| {
                Error::schema(
                    format!(
                        "field '{}' refers to record '{}', which is not declared before '{}'",
                        self.name, name, record
                    ),
                    Some(record),
                )
            })?),
            None => None,
        };

        let mut builder = match (self.kind, &nested) {
            (FieldShape::Scalar, None) => FieldBuilder::scalar(&self.name, self.value_type),
            (FieldShape::Scalar, Some(_)) => {
                return Err(Error::schema(
                    format!("field '{}' names a record but has kind 'scalar'", self.name),
                    Some(record),
                ));
            }
            (FieldShape::Record, Some(schema)) => FieldBuilder::record(&self.name, schema),
            (FieldShape::Record, None) => {
                return Err(Error::schema(
                    format!("record field '{}' does not name its record", self.name),
                    Some(record),
                ));
            }
            (FieldShape::Sequence, Some(schema)) => FieldBuilder::records(&self.name, schema),
            (FieldShape::Sequence, None) => FieldBuilder::sequence(&self.name, self.value_type),
            (FieldShape::Mapping, Some(schema)) => {
                FieldBuilder::mapping(&self.name, ElementType::Record(Arc::clone(schema)))
            }
            (FieldShape::Mapping, None) => {
                FieldBuilder::mapping(&self.name, ElementType::Value(self.value_type))
            }
        };

        if let Some(alias) = &self.alias {
            builder = builder.alias(alias);
        }
        if self.required {
            builder = builder.required();
        }
        if let Some(default) = &self.default {
            builder = builder.default_value(default.clone());
        }
        if self.exclude {
            builder = builder.exclude();
        }
        if let Some(spec) = &self.serializer {
            let serializer = built_in::by_spec(spec).map_err(|e| {
                Error::schema(
                    format!("field '{}' has an invalid serializer: {}", self.name, e),
                    Some(record),
                )
            })?;
            builder = builder.serializer(serializer);
        }

        Ok(builder)
    }
}

/// Compiled schemas, addressable by record name
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    records: Vec<Arc<RecordSchema>>,
    index: HashMap<String, usize>,
    root: Option<String>,
}

impl SchemaSet {
    fn insert(&mut self, schema: Arc<RecordSchema>) {
        self.index.insert(schema.name().to_string(), self.records.len());
        self.records.push(schema);
    }

    /// Look up a record by name
    pub fn get(&self, name: &str) -> Option<&Arc<RecordSchema>> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    /// The declared root record, or the last declared record
    pub fn root(&self) -> Option<&Arc<RecordSchema>> {
        match &self.root {
            Some(name) => self.get(name),
            None => self.records.last(),
        }
    }

    /// Records in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RecordSchema>> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
