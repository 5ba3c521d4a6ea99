//! Rendering of query results.
//!
//! Values are written out through a [`Dump`] implementation. Two are provided
//! by [`DumpMode`]:
//!
//! - [`DumpMode::Magic`] prints scalars bare so they can be used directly in
//!   shell scripts, and complex values as YAML.
//! - [`DumpMode::Yaml`] prints every value as YAML, so that even a string is
//!   quoted when it needs to be and the output can be fed back to a parser.

use crate::document::node::{YamlNumber, YamlValue};
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::Value as SerdeValue;

/// Turns values into text.
pub trait Dump {
    /// Renders one value.
    fn dump(&self, value: &YamlValue) -> Result<String, serde_yaml::Error>;

    /// Written between the outputs of successive documents.
    fn document_separator(&self) -> &'static str;
}

/// Built-in output modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpMode {
    /// Bare scalars, YAML for sequences and mappings.
    #[default]
    Magic,
    /// YAML for everything.
    Yaml,
}

impl Dump for DumpMode {
    fn dump(&self, value: &YamlValue) -> Result<String, serde_yaml::Error> {
        match self {
            DumpMode::Magic => magic_dump(value),
            DumpMode::Yaml => yaml_dump(value),
        }
    }

    fn document_separator(&self) -> &'static str {
        match self {
            DumpMode::Magic => "\0",
            DumpMode::Yaml => "---\n",
        }
    }
}

/// Renders scalars as plain text and everything else as YAML.
///
/// # Example
///
/// ```
/// use shyaml::document::node::YamlValue;
/// use shyaml::file::dumper::magic_dump;
///
/// let value = YamlValue::String("hello world".to_string());
/// assert_eq!(magic_dump(&value).unwrap(), "hello world");
/// assert_eq!(magic_dump(&YamlValue::Boolean(true)).unwrap(), "True");
/// ```
pub fn magic_dump(value: &YamlValue) -> Result<String, serde_yaml::Error> {
    match value {
        YamlValue::String(s) => Ok(s.clone()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Boolean(true) => Ok("True".to_string()),
        YamlValue::Boolean(false) => Ok("False".to_string()),
        YamlValue::Null => Ok("None".to_string()),
        YamlValue::Tagged(_, inner) if inner.is_scalar() => magic_dump(inner),
        YamlValue::Tagged(..) | YamlValue::Mapping(_) | YamlValue::Sequence(_) => {
            yaml_dump(value)
        }
    }
}

/// Renders a value as a block style YAML document.
///
/// A bare plain scalar is followed by an explicit `...` document end marker,
/// so that the output remains a complete document when concatenated.
///
/// # Example
///
/// ```
/// use shyaml::document::node::YamlValue;
/// use shyaml::file::dumper::yaml_dump;
///
/// assert_eq!(yaml_dump(&YamlValue::String("x".into())).unwrap(), "x\n...\n");
/// assert_eq!(yaml_dump(&YamlValue::String("1".into())).unwrap(), "'1'\n");
/// ```
pub fn yaml_dump(value: &YamlValue) -> Result<String, serde_yaml::Error> {
    let mut text = serde_yaml::to_string(&to_serde_value(value))?;
    if is_open_ended(value, &text) {
        text.push_str("...\n");
    }
    Ok(text)
}

fn is_open_ended(value: &YamlValue, text: &str) -> bool {
    let plain_scalar = matches!(
        value,
        YamlValue::String(_) | YamlValue::Number(_) | YamlValue::Boolean(_) | YamlValue::Null
    );
    plain_scalar && !text.starts_with(['\'', '"', '|', '>'])
}

/// Converts a [`YamlValue`] back into a `serde_yaml::Value` for serialization.
pub fn to_serde_value(value: &YamlValue) -> SerdeValue {
    match value {
        YamlValue::Mapping(entries) => {
            let map: serde_yaml::Mapping = entries
                .iter()
                .map(|(k, v)| (to_serde_value(&k.to_value()), to_serde_value(v)))
                .collect();
            SerdeValue::Mapping(map)
        }
        YamlValue::Sequence(items) => {
            SerdeValue::Sequence(items.iter().map(to_serde_value).collect())
        }
        YamlValue::String(s) => SerdeValue::String(s.clone()),
        YamlValue::Number(YamlNumber::Integer(i)) => SerdeValue::Number((*i).into()),
        YamlValue::Number(YamlNumber::Unsigned(u)) => SerdeValue::Number((*u).into()),
        YamlValue::Number(YamlNumber::Float(f)) => SerdeValue::Number((*f).into()),
        YamlValue::Boolean(b) => SerdeValue::Bool(*b),
        YamlValue::Null => SerdeValue::Null,
        // A tag made only of `!` carries no name and cannot be re-emitted.
        YamlValue::Tagged(tag, inner) if tag.trim_start_matches('!').is_empty() => {
            to_serde_value(inner)
        }
        YamlValue::Tagged(tag, inner) => SerdeValue::Tagged(Box::new(TaggedValue {
            tag: Tag::new(tag.as_str()),
            value: to_serde_value(inner),
        })),
    }
}
