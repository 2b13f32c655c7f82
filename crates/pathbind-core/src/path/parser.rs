//! Tokenizer for dot-separated path expressions
//!
//! The grammar is deliberately small: `key`, `key.key`, `key.N`, `key.*`,
//! `key.*.key`, chained arbitrarily.
//!
//! Copyright (c) 2025 Pathbind Team
//! Licensed under the Apache-2.0 license

use super::error::PathError;
use std::fmt;

/// Wildcard token text
pub const WILDCARD: &str = "*";

/// Separator between tokens
pub const SEPARATOR: char = '.';

/// A single step of a path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Mapping lookup by key
    Key(String),
    /// All-digit token: a sequence index, or a literal key on mappings.
    /// `value` is `None` when the digits overflow `usize`.
    Index { literal: String, value: Option<usize> },
    /// Fan out over every element of a sequence
    Wildcard,
}

impl Token {
    fn from_segment(segment: &str) -> Self {
        if segment == WILDCARD {
            Token::Wildcard
        } else if segment.bytes().all(|b| b.is_ascii_digit()) {
            Token::Index {
                literal: segment.to_string(),
                value: segment.parse().ok(),
            }
        } else {
            Token::Key(segment.to_string())
        }
    }

    /// Whether this token fans out
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Token::Wildcard)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Key(key) => write!(f, "{}", key),
            Token::Index { literal, .. } => write!(f, "{}", literal),
            Token::Wildcard => write!(f, "{}", WILDCARD),
        }
    }
}

/// Split a path expression into tokens
pub fn tokenize(input: &str) -> Result<Vec<Token>, PathError> {
    if input.is_empty() {
        return Err(PathError::Empty);
    }

    let mut tokens = Vec::new();
    let mut position = 0;
    for segment in input.split(SEPARATOR) {
        if segment.is_empty() {
            return Err(PathError::EmptySegment {
                position,
                input: input.to_string(),
            });
        }
        tokens.push(Token::from_segment(segment));
        position += segment.len() + SEPARATOR.len_utf8();
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_mixed_path() {
        let tokens = tokenize("items.*.tags.0").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Key("items".to_string()),
                Token::Wildcard,
                Token::Key("tags".to_string()),
                Token::Index {
                    literal: "0".to_string(),
                    value: Some(0)
                },
            ]
        );
    }

    #[test]
    fn test_negative_numbers_are_keys() {
        let tokens = tokenize("a.-1").unwrap();
        assert_eq!(tokens[1], Token::Key("-1".to_string()));
    }

    #[test]
    fn test_overflowing_index_keeps_literal() {
        let tokens = tokenize("99999999999999999999999999").unwrap();
        assert!(matches!(&tokens[0], Token::Index { value: None, .. }));
    }

    #[test]
    fn test_empty_segments_rejected() {
        assert_eq!(tokenize(""), Err(PathError::Empty));

        let err = tokenize("a..b").unwrap_err();
        assert_eq!(err.position(), Some(2));

        assert!(tokenize(".a").is_err());
        assert!(tokenize("a.").is_err());
    }
}
