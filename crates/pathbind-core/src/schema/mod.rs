//! Record schemas
//!
//! A schema describes one record type: its ordered fields, the path each field
//! is bound from, how the bound value is typed, and how it is written out.
//!
//! - [`types`] - Field descriptors, kinds and the frozen schema table
//! - [`builder`] - Fluent builder API for declaring schemas in code
//! - [`declaration`] - Serde-loadable schema documents compiled into schemas
//!
//! # Examples
//!
//! ```
//! use pathbind_core::schema::{FieldBuilder, RecordSchema, ValueType};
//!
//! let user = RecordSchema::builder("User")
//!     .field(FieldBuilder::scalar("id", ValueType::Integer).required())
//!     .field(FieldBuilder::scalar("city", ValueType::String).alias("address.city"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(user.field("city").unwrap().alias().as_str(), "address.city");
//! ```
//!
//! Copyright (c) 2025 Pathbind Team
//! Licensed under the Apache-2.0 license

pub mod builder;
pub mod declaration;
pub mod types;

pub use builder::{is_identifier, FieldBuilder, RecordSchemaBuilder};
pub use declaration::{
    ComputedDeclaration, DerivationDeclaration, FieldDeclaration, FieldShape, RecordDeclaration,
    SchemaDocument, SchemaSet,
};
pub use types::{
    Derivation, DerivationFn, ElementType, FieldDescriptor, FieldKind, FieldSerializer,
    RecordSchema, SerializerFn, ValueType,
};
