//! Error types for path expression parsing
//!
//! Resolution itself never fails; these errors are raised only when a path
//! expression is declared, so bad aliases are caught when a schema is built.
//!
//! Copyright (c) 2025 Pathbind Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Path expression parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The expression contains no tokens at all
    #[error("Path expression is empty")]
    Empty,

    /// Two separators with nothing between them, or a leading/trailing dot
    #[error("Empty segment at position {position} in '{input}'")]
    EmptySegment { position: usize, input: String },
}

impl PathError {
    /// Byte offset of the offending segment, when known
    pub fn position(&self) -> Option<usize> {
        match self {
            PathError::Empty => None,
            PathError::EmptySegment { position, .. } => Some(*position),
        }
    }
}
