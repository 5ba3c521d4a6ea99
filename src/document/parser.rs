//! YAML stream parsing.
//!
//! This module turns YAML text into [`YamlValue`] documents using `serde_yaml`,
//! then normalises what `serde_yaml` leaves as-is:
//!
//! - `<<` merge keys are flattened into the enclosing mapping
//! - keys that are not strings are looked up by their textual form but keep
//!   their value for output
//! - local tags are kept as [`YamlValue::Tagged`]
//!
//! # Example
//!
//! ```
//! use shyaml::document::parser::parse_yaml_documents;
//!
//! let docs = parse_yaml_documents("a: 1\n---\nb: 2\n").unwrap();
//! assert_eq!(docs.len(), 2);
//! ```

use super::node::{YamlKey, YamlNumber, YamlValue};
use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value as SerdeValue;

const MERGE_KEY: &str = "<<";

/// Parses every document of a YAML stream.
///
/// Parsing stops at the first malformed document: the returned list holds
/// the documents preceding it followed by its error. An empty stream yields
/// an empty list.
pub fn parse_yaml_stream(source: &str) -> Vec<Result<YamlValue>> {
    let mut documents = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_str(source).enumerate() {
        let parsed = SerdeValue::deserialize(document)
            .with_context(|| format!("Failed to parse YAML document {}", index + 1))
            .and_then(convert_value);
        let failed = parsed.is_err();
        documents.push(parsed);
        if failed {
            break;
        }
    }
    documents
}

/// Parses every document of a YAML stream, failing on the first error.
pub fn parse_yaml_documents(source: &str) -> Result<Vec<YamlValue>> {
    parse_yaml_stream(source).into_iter().collect()
}

/// Converts a `serde_yaml::Value` into a [`YamlValue`].
pub fn convert_value(value: SerdeValue) -> Result<YamlValue> {
    Ok(match value {
        SerdeValue::Null => YamlValue::Null,
        SerdeValue::Bool(b) => YamlValue::Boolean(b),
        SerdeValue::Number(n) => YamlValue::Number(convert_number(&n)),
        SerdeValue::String(s) => YamlValue::String(s),
        SerdeValue::Sequence(items) => YamlValue::Sequence(
            items
                .into_iter()
                .map(convert_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        SerdeValue::Mapping(map) => YamlValue::Mapping(convert_mapping(map)?),
        SerdeValue::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            YamlValue::Tagged(tag, Box::new(convert_value(tagged.value)?))
        }
    })
}

fn convert_number(n: &serde_yaml::Number) -> YamlNumber {
    if let Some(i) = n.as_i64() {
        YamlNumber::Integer(i)
    } else if let Some(u) = n.as_u64() {
        YamlNumber::Unsigned(u)
    } else {
        YamlNumber::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Converts a mapping, flattening `<<` merge keys.
///
/// Merged entries come first, in the order of the merged mappings; explicit
/// entries override merged values but keep the merged position. When a list
/// of mappings is merged, earlier mappings take precedence over later ones.
fn convert_mapping(map: serde_yaml::Mapping) -> Result<IndexMap<YamlKey, YamlValue>> {
    let mut merged: Vec<IndexMap<YamlKey, YamlValue>> = Vec::new();
    let mut own = Vec::with_capacity(map.len());

    for (key, value) in map {
        if matches!(&key, SerdeValue::String(k) if k == MERGE_KEY) {
            merged.extend(merge_sources(value)?);
            continue;
        }
        own.push((convert_key(key)?, convert_value(value)?));
    }

    let mut entries = IndexMap::with_capacity(own.len());
    for source in merged.into_iter().rev() {
        entries.extend(source);
    }
    entries.extend(own);
    Ok(entries)
}

/// Returns the mappings referenced by a `<<` entry, in declaration order.
fn merge_sources(value: SerdeValue) -> Result<Vec<IndexMap<YamlKey, YamlValue>>> {
    match value {
        SerdeValue::Mapping(map) => Ok(vec![convert_mapping(map)?]),
        SerdeValue::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                SerdeValue::Mapping(map) => convert_mapping(map),
                other => bail!(
                    "expected a mapping for merging, but found {}",
                    describe(&other)
                ),
            })
            .collect(),
        other => bail!(
            "expected a mapping or list of mappings for merging, but found {}",
            describe(&other)
        ),
    }
}

/// Converts a mapping key, keeping the value of keys that are not strings.
fn convert_key(key: SerdeValue) -> Result<YamlKey> {
    if let SerdeValue::String(text) = key {
        return Ok(YamlKey::from(text));
    }
    let text = key_text(&key)?;
    Ok(YamlKey::typed(text, convert_value(key)?))
}

/// Textual form of a mapping key, used to look it up from a key path.
fn key_text(key: &SerdeValue) -> Result<String> {
    Ok(match key {
        SerdeValue::String(s) => s.clone(),
        SerdeValue::Null => "null".to_string(),
        SerdeValue::Bool(b) => b.to_string(),
        SerdeValue::Number(n) => convert_number(n).to_string(),
        SerdeValue::Tagged(tagged) => key_text(&tagged.value)?,
        complex @ (SerdeValue::Sequence(_) | SerdeValue::Mapping(_)) => {
            let text = serde_yaml::to_string(complex).context("Failed to render mapping key")?;
            text.trim_end().to_string()
        }
    })
}

fn describe(value: &SerdeValue) -> &'static str {
    match value {
        SerdeValue::Null => "null",
        SerdeValue::Bool(_) => "a boolean",
        SerdeValue::Number(_) => "a number",
        SerdeValue::String(_) => "a string",
        SerdeValue::Sequence(_) => "a sequence",
        SerdeValue::Mapping(_) => "a mapping",
        SerdeValue::Tagged(_) => "a tagged value",
    }
}
