//! Pathbind Core - path-expression data binding and serialization
//!
//! This crate binds arbitrarily shaped JSON documents onto statically
//! declared record schemas, using a per-field path expression, and writes the
//! resulting records back out through a deterministic serialization pipeline.
//!
//! # Main Components
//!
//! - **Path Resolver**: dot-separated keys, indices and `*` wildcards with flattening
//! - **Schemas**: ordered field tables, declared in code or loaded from documents
//! - **Binder**: resolves every field and hands raw values to a coercion layer
//! - **Serialization**: structured mappings, JSON text and display text
//! - **Retry**: exponential backoff for the async I/O around binding
//!
//! # Example
//!
//! ```
//! use pathbind_core::schema::{FieldBuilder, RecordSchema, ValueType};
//! use pathbind_core::{Record, Result};
//! use serde_json::json;
//!
//! fn example() -> Result<()> {
//!     let user = RecordSchema::builder("User")
//!         .field(FieldBuilder::scalar("id", ValueType::Integer).required())
//!         .field(FieldBuilder::sequence("tags", ValueType::String).alias("posts.*.tags"))
//!         .build()?;
//!
//!     let document = json!({"id": 7, "posts": [{"tags": ["a", "b"]}, {"tags": ["c"]}]});
//!     let record = Record::bind(&user, &document)?;
//!
//!     assert_eq!(record.dump_json()?, r#"{"id":7,"tags":["a","b","c"]}"#);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod binder;
pub mod coercion;
pub mod error;
pub mod path;
pub mod record;
pub mod retry;
pub mod schema;
pub mod serializer;

// Re-export main types for convenience
pub use binder::{bind, Binder};
pub use coercion::{Coercer, CoercionMode, TypeCoercion};
pub use error::{Error, Result, SerializerError};
pub use path::{resolve, PathError, PathExpression};
pub use record::{FieldValue, Record, RecordBuilder};
pub use retry::{retry_all, retry_async, RetryPolicy};
pub use schema::{
    Derivation, ElementType, FieldBuilder, FieldKind, FieldSerializer, RecordSchema, SchemaDocument,
    SchemaSet, ValueType,
};
pub use serializer::DumpOptions;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_top_level_resolve() {
        let data = json!({"a": [{"b": 1}, {"b": 2}]});
        assert_eq!(resolve(&data, "a.*.b", json!(null)), json!([1, 2]));
    }
}
