//! Parsed form of a key specification.

use std::fmt;

/// An ordered list of literal path segments.
///
/// An empty list selects the whole document. Segments are compared verbatim
/// against mapping keys, so an empty segment addresses the `""` key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPath {
    /// Segments in traversal order, escapes already resolved.
    pub segments: Vec<String>,
}

impl KeyPath {
    /// Creates a path from already unescaped segments.
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// The path that selects the whole document.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

/// Writes the path back as a key specification, escaping `.` and `\`.
impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&super::parser::escape(segment))?;
        }
        Ok(())
    }
}
