//! Serialization pipeline for bound records
//!
//! Turns a [`Record`](crate::Record) into one of three equivalent outputs: a
//! structured ordered mapping, JSON text, or display text. Every visible
//! field is normalized, then passed through its custom serializer. Computed
//! fields are derived fresh and appended after the regular ones.
//!
//! - [`pipeline`] - Per-field normalization and the output forms
//! - [`built_in`] - Ready-made serializers and derivations
//!
//! # Examples
//!
//! ```
//! use pathbind_core::schema::{FieldBuilder, RecordSchema, ValueType};
//! use pathbind_core::serializer::built_in;
//! use pathbind_core::Record;
//! use serde_json::json;
//!
//! let schema = RecordSchema::builder("User")
//!     .field(FieldBuilder::scalar("name", ValueType::String).serializer(built_in::uppercase()))
//!     .field(FieldBuilder::scalar("age", ValueType::Integer))
//!     .build()
//!     .unwrap();
//!
//! let user = Record::bind(&schema, &json!({"name": "ada", "age": 36})).unwrap();
//! assert_eq!(user.dump_json().unwrap(), r#"{"name":"ADA","age":36}"#);
//! assert_eq!(user.dump_display().unwrap(), "name='ADA' age=36");
//! ```
//!
//! Copyright (c) 2025 Pathbind Team
//! Licensed under the Apache-2.0 license

pub mod built_in;
pub mod pipeline;

#[cfg(test)]
mod tests;

pub use pipeline::{
    display_mapping, display_value, dump, dump_display, dump_json, dump_json_pretty, dump_with, DumpOptions,
};
