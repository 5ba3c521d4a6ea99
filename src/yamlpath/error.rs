//! Error types for key path traversal.

use std::fmt;

/// Reasons a key path fails to resolve against a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalError {
    /// A mapping has no entry for the requested key.
    MissingKey { key: String },
    /// A sequence index is outside the sequence.
    IndexOutOfRange { index: String, len: usize },
    /// A sequence was indexed with something that is not an integer.
    IndexNotInteger { segment: String },
    /// Segments remain but the current value is a scalar.
    NonTraversable {
        segment: String,
        /// Short rendering of the leaf, omitted when too long to be useful.
        leaf: Option<String>,
    },
}

impl TraversalError {
    /// Whether a default value may stand in for the missing data.
    ///
    /// Missing keys and out of range indexes describe absent data; the other
    /// variants describe a query that does not fit the document and always
    /// surface.
    pub fn is_missing_data(&self) -> bool {
        matches!(
            self,
            TraversalError::MissingKey { .. } | TraversalError::IndexOutOfRange { .. }
        )
    }
}

impl fmt::Display for TraversalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraversalError::MissingKey { key } => {
                write!(f, "missing key {} in struct.", quote(key))
            }
            TraversalError::IndexOutOfRange { index, len } => write!(
                f,
                "index {} is out of range ({} elements in sequence).",
                index, len
            ),
            TraversalError::IndexNotInteger { segment } => write!(
                f,
                "non-integer index {} provided on a sequence.",
                quote(segment)
            ),
            TraversalError::NonTraversable { segment, leaf } => {
                write!(f, "can't query subvalue {} of a leaf", quote(segment))?;
                if let Some(leaf) = leaf {
                    write!(f, " (leaf value is {})", leaf)?;
                }
                f.write_str(".")
            }
        }
    }
}

impl std::error::Error for TraversalError {}

/// A key specification that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPath {
    /// The key specification as given by the user.
    pub path: String,
    pub cause: TraversalError,
}

impl fmt::Display for InvalidPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid path {}, {}", quote(&self.path), self.cause)
    }
}

impl std::error::Error for InvalidPath {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Quotes text for messages.
///
/// Single quotes are used unless the text contains a single quote and no
/// double quote, in which case it is double-quoted as is.
pub(crate) fn quote(text: &str) -> String {
    let delimiter = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push(delimiter);
    for ch in text.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            ch if ch == delimiter => {
                quoted.push('\\');
                quoted.push(ch);
            }
            _ => quoted.push(ch),
        }
    }
    quoted.push(delimiter);
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_message() {
        let err = TraversalError::MissingKey { key: "y".into() };
        assert_eq!(err.to_string(), "missing key 'y' in struct.");
    }

    #[test]
    fn test_out_of_range_message() {
        let err = TraversalError::IndexOutOfRange {
            index: "-10".into(),
            len: 3,
        };
        assert_eq!(
            err.to_string(),
            "index -10 is out of range (3 elements in sequence)."
        );
    }

    #[test]
    fn test_non_traversable_message_with_and_without_leaf() {
        let with_leaf = TraversalError::NonTraversable {
            segment: "y".into(),
            leaf: Some("1".into()),
        };
        assert_eq!(
            with_leaf.to_string(),
            "can't query subvalue 'y' of a leaf (leaf value is 1)."
        );

        let without_leaf = TraversalError::NonTraversable {
            segment: "y".into(),
            leaf: None,
        };
        assert_eq!(without_leaf.to_string(), "can't query subvalue 'y' of a leaf.");
    }

    #[test]
    fn test_invalid_path_message() {
        let err = InvalidPath {
            path: "a.x".into(),
            cause: TraversalError::IndexNotInteger {
                segment: "x".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "invalid path 'a.x', non-integer index 'x' provided on a sequence."
        );
    }

    #[test]
    fn test_quote_picks_delimiter() {
        assert_eq!(quote("plain"), "'plain'");
        assert_eq!(quote("it's a"), "\"it's a\"");
        assert_eq!(quote("it's \"a\""), "'it\\'s \"a\"'");
        assert_eq!(quote(r"a\.b"), r"'a\\.b'");
        assert_eq!(
            TraversalError::MissingKey {
                key: "it's".into()
            }
            .to_string(),
            "missing key \"it's\" in struct."
        );
    }

    #[test]
    fn test_missing_data_classification() {
        assert!(TraversalError::MissingKey { key: "k".into() }.is_missing_data());
        assert!(TraversalError::IndexOutOfRange {
            index: "3".into(),
            len: 1
        }
        .is_missing_data());
        assert!(!TraversalError::IndexNotInteger {
            segment: "k".into()
        }
        .is_missing_data());
        assert!(!TraversalError::NonTraversable {
            segment: "k".into(),
            leaf: None
        }
        .is_missing_data());
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r"a\b"), r"'a\\b'");
        assert_eq!(quote("it's"), r"'it\'s'");
    }
}
