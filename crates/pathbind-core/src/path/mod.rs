//! Restricted path expressions over JSON documents
//!
//! A path is a dot-separated chain of plain keys, non-negative indices and the
//! `*` wildcard. Resolution never fails: any structural mismatch yields the
//! caller's default. A wildcard applies the rest of the path to every element
//! of a sequence and concatenates the results, flattening nested sequences
//! so `items.*.tags` produces one ordered list of tags.
//!
//! Copyright (c) 2025 Pathbind Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod flatten;
pub mod parser;


pub use error::PathError;
pub use flatten::flatten;
pub use parser::{tokenize, Token, SEPARATOR, WILDCARD};

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpression {
    source: String,
    tokens: Vec<Token>,
    has_wildcard: bool,
}

impl PathExpression {
    /// Parse a path expression
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let tokens = tokenize(path)?;
        let has_wildcard = tokens.iter().any(Token::is_wildcard);
        Ok(Self {
            source: path.to_string(),
            tokens,
            has_wildcard,
        })
    }

    /// Single-key path for a field name, used when no alias is configured
    pub fn key(name: &str) -> Self {
        Self {
            source: name.to_string(),
            tokens: vec![Token::Key(name.to_string())],
            has_wildcard: false,
        }
    }

    /// Resolve against a document, returning `default` on any mismatch
    pub fn resolve(&self, document: &Value, default: Value) -> Value {
        walk(document, &self.tokens).unwrap_or(default)
    }

    /// Resolve and report a miss as `None`
    pub fn find(&self, document: &Value) -> Option<Value> {
        walk(document, &self.tokens)
    }

    /// Candidate values for binding.
    ///
    /// A miss or a `null` result yields no matches. A wildcard path yields
    /// every element of its flattened result; any other path yields its
    /// single result, even when that result is itself a sequence.
    pub fn matches(&self, document: &Value) -> Vec<Value> {
        self.find_matches(document).unwrap_or_default()
    }

    /// Like [`matches`](Self::matches), but tells a miss (`None`) apart from a
    /// wildcard that matched zero elements (`Some(vec![])`)
    pub fn find_matches(&self, document: &Value) -> Option<Vec<Value>> {
        match walk(document, &self.tokens)? {
            Value::Null => None,
            Value::Array(items) if self.has_wildcard => Some(items),
            value => Some(vec![value]),
        }
    }

    /// Whether the expression contains a `*` token
    pub fn has_wildcard(&self) -> bool {
        self.has_wildcard
    }

    /// Whether the expression is a single plain key
    pub fn is_simple_key(&self) -> bool {
        matches!(self.tokens.as_slice(), [Token::Key(_)])
    }

    /// Parsed tokens
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Original expression text
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for PathExpression {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Resolve a path string against a document.
///
/// An expression that does not parse is treated like any other miss.
pub fn resolve(document: &Value, path: &str, default: Value) -> Value {
    match PathExpression::parse(path) {
        Ok(expression) => expression.resolve(document, default),
        Err(_) => default,
    }
}

/// Walk `tokens` from `node`; `None` means the path did not match.
fn walk(node: &Value, tokens: &[Token]) -> Option<Value> {
    let mut cursor = node;

    for (i, token) in tokens.iter().enumerate() {
        if cursor.is_null() {
            return None;
        }

        match token {
            Token::Wildcard => {
                let items = cursor.as_array()?;
                let rest = &tokens[i + 1..];
                if rest.is_empty() {
                    return Some(Value::Array(flatten(items.clone())));
                }

                let collected: Vec<Value> = items
                    .iter()
                    .filter_map(|item| walk(item, rest))
                    .filter(|value| !value.is_null())
                    .collect();
                return Some(Value::Array(flatten(collected)));
            }
            Token::Key(key) => {
                cursor = cursor.as_object()?.get(key)?;
            }
            Token::Index { literal, value } => {
                cursor = match cursor {
                    Value::Array(items) => items.get((*value)?)?,
                    Value::Object(map) => map.get(literal)?,
                    _ => return None,
                };
            }
        }
    }

    match cursor {
        Value::Array(items) => Some(Value::Array(flatten(items.clone()))),
        other => Some(other.clone()),
    }
}
