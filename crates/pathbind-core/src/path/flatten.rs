//! Sequence flattening
//!
//! Copyright (c) 2025 Pathbind Team
//! Licensed under the Apache-2.0 license

use serde_json::Value;

/// Recursively merge nested arrays into one ordered array.
///
/// Elements are visited depth-first and keep their relative order. Only
/// arrays are expanded; objects are kept whole.
pub fn flatten(values: Vec<Value>) -> Vec<Value> {
    let mut out = Vec::with_capacity(values.len());
    flatten_into(values, &mut out);
    out
}

fn flatten_into(values: Vec<Value>, out: &mut Vec<Value>) {
    for value in values {
        match value {
            Value::Array(inner) => flatten_into(inner, out),
            other => out.push(other),
        }
    }
}
