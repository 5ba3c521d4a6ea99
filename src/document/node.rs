//! In-memory representation of a parsed YAML document.
//!
//! Every document read from the input stream is converted into a [`YamlValue`]
//! tree. The tree is a closed set of shapes (mappings, sequences and scalars)
//! so that path traversal and actions can match on it exhaustively.
//!
//! # Example
//!
//! ```
//! use shyaml::document::node::{YamlKey, YamlNumber, YamlValue};
//! use indexmap::IndexMap;
//!
//! let mut map = IndexMap::new();
//! map.insert(YamlKey::from("name"), YamlValue::String("shyaml".to_string()));
//! map.insert(
//!     YamlKey::typed("1", YamlValue::Number(YamlNumber::Integer(1))),
//!     YamlValue::String("first".to_string()),
//! );
//! let doc = YamlValue::Mapping(map);
//!
//! assert_eq!(doc.type_name(), "struct");
//! assert_eq!(doc.len(), Some(2));
//! ```

use indexmap::IndexMap;
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Represents YAML numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum YamlNumber {
    Integer(i64),
    /// Integers above `i64::MAX`.
    Unsigned(u64),
    Float(f64),
}

impl fmt::Display for YamlNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YamlNumber::Integer(i) => write!(f, "{}", i),
            YamlNumber::Unsigned(u) => write!(f, "{}", u),
            YamlNumber::Float(fl) => f.write_str(&format_float(*fl)),
        }
    }
}

impl YamlNumber {
    pub fn is_float(&self) -> bool {
        matches!(self, YamlNumber::Float(_))
    }
}

/// Formats a float in its shortest round-trip form.
///
/// Integral values keep a trailing `.0` so that the text still reads as a
/// float, and very large or very small magnitudes switch to exponent notation
/// with a signed, two-digit exponent (`1e+16`, `1.5e-05`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => formatted,
        };
    }

    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// A mapping key.
///
/// Keys are looked up by their text, so `1` and `"1"` address the same entry
/// from a key path. A key that was not a plain string (`1`, `true`, `~`)
/// also remembers its value, so that it is written back with its own type.
#[derive(Debug, Clone)]
pub struct YamlKey {
    text: String,
    value: Option<Box<YamlValue>>,
}

impl YamlKey {
    /// A key that is not a plain string, looked up as `text`.
    pub fn typed(text: impl Into<String>, value: YamlValue) -> Self {
        Self {
            text: text.into(),
            value: Some(Box::new(value)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The key as it appeared in the document.
    pub fn to_value(&self) -> Cow<'_, YamlValue> {
        match &self.value {
            Some(value) => Cow::Borrowed(&**value),
            None => Cow::Owned(YamlValue::String(self.text.clone())),
        }
    }
}

impl From<String> for YamlKey {
    fn from(text: String) -> Self {
        Self { text, value: None }
    }
}

impl From<&str> for YamlKey {
    fn from(text: &str) -> Self {
        Self::from(text.to_string())
    }
}

impl PartialEq for YamlKey {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for YamlKey {}

// Must agree with `str` hashing for `Borrow<str>` lookups.
impl Hash for YamlKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl Borrow<str> for YamlKey {
    fn borrow(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for YamlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A YAML value.
///
/// Mappings keep their entries in document order; keys are unique within a
/// mapping. Values carrying an application specific tag (such as `!secret`)
/// are wrapped in [`YamlValue::Tagged`] so the tag survives a round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum YamlValue {
    /// A YAML mapping, named `struct` on the command line
    Mapping(IndexMap<YamlKey, YamlValue>),
    /// A YAML sequence
    Sequence(Vec<YamlValue>),
    String(String),
    Number(YamlNumber),
    Boolean(bool),
    Null,
    /// A value with a local tag, e.g. `!env HOME`
    Tagged(String, Box<YamlValue>),
}

impl YamlValue {
    /// Returns the value with every tag wrapper removed.
    pub fn untagged(&self) -> &YamlValue {
        let mut value = self;
        while let YamlValue::Tagged(_, inner) = value {
            value = inner;
        }
        value
    }

    /// Returns true if this value is a mapping, looking through tags.
    pub fn is_mapping(&self) -> bool {
        matches!(self.untagged(), YamlValue::Mapping(_))
    }

    /// Returns true if this value is a sequence, looking through tags.
    pub fn is_sequence(&self) -> bool {
        matches!(self.untagged(), YamlValue::Sequence(_))
    }

    /// Returns true for anything that is neither a mapping nor a sequence.
    pub fn is_scalar(&self) -> bool {
        !self.is_mapping() && !self.is_sequence()
    }

    /// Number of entries of a mapping or elements of a sequence.
    ///
    /// Scalars have no length and return `None`.
    pub fn len(&self) -> Option<usize> {
        match self.untagged() {
            YamlValue::Mapping(entries) => Some(entries.len()),
            YamlValue::Sequence(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Returns true for an empty mapping or sequence.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Short type name reported by `get-type` and in type mismatch errors.
    ///
    /// # Example
    ///
    /// ```
    /// use shyaml::document::node::YamlValue;
    ///
    /// assert_eq!(YamlValue::Sequence(vec![]).type_name(), "sequence");
    /// assert_eq!(YamlValue::Null.type_name(), "NoneType");
    /// assert_eq!(
    ///     YamlValue::Tagged("!env".to_string(), Box::new(YamlValue::Null)).type_name(),
    ///     "!env"
    /// );
    /// ```
    pub fn type_name(&self) -> &str {
        match self {
            YamlValue::Mapping(_) => "struct",
            YamlValue::Sequence(_) => "sequence",
            YamlValue::String(_) => "str",
            YamlValue::Number(n) if n.is_float() => "float",
            YamlValue::Number(_) => "int",
            YamlValue::Boolean(_) => "bool",
            YamlValue::Null => "NoneType",
            YamlValue::Tagged(tag, _) => tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float_integral_keeps_decimal() {
        assert_eq!(format_float(3.0), "3.0");
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(1e10), "10000000000.0");
    }

    #[test]
    fn test_format_float_fractional() {
        assert_eq!(format_float(2.75), "2.75");
        assert_eq!(format_float(0.1), "0.1");
    }

    #[test]
    fn test_format_float_exponent_forms() {
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1.5e-5), "1.5e-05");
        assert_eq!(format_float(2.5e120), "2.5e+120");
    }

    #[test]
    fn test_format_float_special_values() {
        assert_eq!(format_float(f64::NAN), "nan");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_yaml_number_display() {
        assert_eq!(YamlNumber::Integer(-42).to_string(), "-42");
        assert_eq!(YamlNumber::Unsigned(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(YamlNumber::Float(42.5).to_string(), "42.5");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(YamlValue::Mapping(IndexMap::new()).type_name(), "struct");
        assert_eq!(YamlValue::String("x".into()).type_name(), "str");
        assert_eq!(YamlValue::Number(YamlNumber::Integer(1)).type_name(), "int");
        assert_eq!(YamlValue::Number(YamlNumber::Float(1.0)).type_name(), "float");
        assert_eq!(YamlValue::Boolean(false).type_name(), "bool");
    }

    #[test]
    fn test_tagged_shape_looks_through_tag() {
        let tagged = YamlValue::Tagged(
            "!list".to_string(),
            Box::new(YamlValue::Sequence(vec![YamlValue::Null])),
        );
        assert!(tagged.is_sequence());
        assert!(!tagged.is_scalar());
        assert_eq!(tagged.len(), Some(1));
        assert_eq!(tagged.type_name(), "!list");
    }

    #[test]
    fn test_typed_key_is_found_by_text() {
        let mut map = IndexMap::new();
        map.insert(
            YamlKey::typed("true", YamlValue::Boolean(true)),
            YamlValue::String("yes".into()),
        );
        map.insert(YamlKey::from("name"), YamlValue::Null);

        assert_eq!(map["true"], YamlValue::String("yes".into()));
        let (key, _) = map.get_key_value("true").unwrap();
        assert_eq!(*key.to_value(), YamlValue::Boolean(true));
        let (key, _) = map.get_key_value("name").unwrap();
        assert_eq!(*key.to_value(), YamlValue::String("name".into()));
    }

    #[test]
    fn test_scalar_has_no_length() {
        assert_eq!(YamlValue::Null.len(), None);
        assert!(!YamlValue::Null.is_empty());
        assert!(YamlValue::Sequence(vec![]).is_empty());
    }
}
