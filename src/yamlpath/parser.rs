//! Key specification tokenizer.
//!
//! A key specification is a dotted path such as `users.0.name`. The
//! characters `.` and `\` are special and can be part of a key when
//! preceded by a `\`:
//!
//! | Input        | Segments              |
//! |--------------|-----------------------|
//! | `a.b`        | `a`, `b`              |
//! | `a\.b`       | `a.b`                 |
//! | `a\\.b`      | `a\`, `b`             |
//! | `a..b`       | `a`, ``, `b`          |
//! | `a\xb`       | `a\xb`                |
//!
//! Any other backslash is kept literally, including a trailing one.

use super::ast::KeyPath;
use std::iter::Peekable;
use std::str::Chars;

/// Tokenizer for key specifications.
pub struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Parser<'a> {
    /// Creates a new tokenizer over the given key specification.
    pub fn new(spec: &'a str) -> Self {
        Self {
            chars: spec.chars().peekable(),
        }
    }

    /// Tokenizes a key specification.
    ///
    /// An absent specification yields the root path. The empty string yields
    /// a single empty segment. Tokenizing never fails.
    ///
    /// # Example
    ///
    /// ```
    /// use shyaml::yamlpath::Parser;
    ///
    /// let path = Parser::parse(Some(r"foo.dot<\.>.slash<\\>"));
    /// assert_eq!(path.segments, vec!["foo", "dot<.>", r"slash<\>"]);
    ///
    /// assert_eq!(Parser::parse(Some("")).segments, vec![""]);
    /// assert!(Parser::parse(None).is_root());
    /// ```
    pub fn parse(spec: Option<&str>) -> KeyPath {
        match spec {
            Some(spec) => Parser::new(spec).parse_segments(),
            None => KeyPath::root(),
        }
    }

    fn parse_segments(&mut self) -> KeyPath {
        let mut segments = vec![self.parse_segment()];
        while self.chars.next().is_some() {
            segments.push(self.parse_segment());
        }
        KeyPath::new(segments)
    }

    /// Consumes characters up to, not including, the next unescaped dot.
    fn parse_segment(&mut self) -> String {
        let mut segment = String::new();
        while let Some(&ch) = self.chars.peek() {
            match ch {
                '.' => break,
                '\\' => {
                    self.chars.next();
                    match self.chars.next() {
                        Some(escaped @ ('.' | '\\')) => segment.push(escaped),
                        Some(other) => {
                            segment.push('\\');
                            segment.push(other);
                        }
                        None => segment.push('\\'),
                    }
                }
                _ => {
                    segment.push(ch);
                    self.chars.next();
                }
            }
        }
        segment
    }
}

/// Shorthand for [`Parser::parse`].
pub fn tokenize(spec: Option<&str>) -> KeyPath {
    Parser::parse(spec)
}

/// Escapes a mapping key so that it tokenizes back to a single segment.
///
/// # Example
///
/// ```
/// use shyaml::yamlpath::{escape, tokenize};
///
/// let key = r"a.b\c";
/// assert_eq!(escape(key), r"a\.b\\c");
/// assert_eq!(tokenize(Some(&escape(key))).segments, vec![key]);
/// ```
pub fn escape(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for ch in key.chars() {
        if ch == '.' || ch == '\\' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(spec: &str) -> Vec<String> {
        tokenize(Some(spec)).segments
    }

    #[test]
    fn test_simple_dotted_path() {
        assert_eq!(segments("foo.bar.wiz"), vec!["foo", "bar", "wiz"]);
    }

    #[test]
    fn test_single_segment() {
        assert_eq!(segments("foo"), vec!["foo"]);
    }

    #[test]
    fn test_empty_string_is_one_empty_segment() {
        assert_eq!(segments(""), vec![""]);
    }

    #[test]
    fn test_absent_spec_is_root() {
        assert!(tokenize(None).is_root());
        assert_eq!(tokenize(None).len(), 0);
    }

    #[test]
    fn test_empty_segments() {
        assert_eq!(segments("foo..bar"), vec!["foo", "", "bar"]);
        assert_eq!(segments(".foo"), vec!["", "foo"]);
        assert_eq!(segments("foo."), vec!["foo", ""]);
        assert_eq!(segments("b.."), vec!["b", "", ""]);
        assert_eq!(segments("."), vec!["", ""]);
    }

    #[test]
    fn test_escaped_dot_and_backslash() {
        assert_eq!(segments(r"a\.x"), vec!["a.x"]);
        assert_eq!(segments(r"a\\x"), vec![r"a\x"]);
        assert_eq!(segments(r"a\\\.x"), vec![r"a\.x"]);
        assert_eq!(segments(r"a\\.x"), vec![r"a\", "x"]);
        assert_eq!(segments(r"a\.b\\\.c"), vec![r"a.b\.c"]);
    }

    #[test]
    fn test_other_backslashes_are_literal() {
        assert_eq!(segments(r"a\xb"), vec![r"a\xb"]);
        assert_eq!(segments(r"\n.t"), vec![r"\n", "t"]);
        assert_eq!(segments("a\\"), vec!["a\\"]);
    }

    #[test]
    fn test_negative_index_is_plain_segment() {
        assert_eq!(segments("groceries.-1"), vec!["groceries", "-1"]);
    }

    #[test]
    fn test_multibyte_characters() {
        assert_eq!(segments("clé.日本\\.語"), vec!["clé", "日本.語"]);
    }

    #[test]
    fn test_escape_round_trip() {
        for key in ["plain", "a.b", r"a\b", r"\.", "..", "", r"trail\", "x.y\\.z"] {
            let path = tokenize(Some(&escape(key)));
            assert_eq!(path.segments, vec![key.to_string()], "key {:?}", key);
        }
    }

    #[test]
    fn test_display_re_escapes() {
        let path = KeyPath::new(vec!["a.b".into(), "".into(), r"c\".into()]);
        assert_eq!(path.to_string(), r"a\.b..c\\");
        assert_eq!(tokenize(Some(&path.to_string())), path);
    }
}
