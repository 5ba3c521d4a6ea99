use super::ast::KeyPath;
use super::error::{quote, InvalidPath, TraversalError};
use super::parser::tokenize;
use crate::document::node::YamlValue;
use std::borrow::Cow;
use std::num::IntErrorKind;

/// Leaf renderings at least this long are left out of error messages.
const MAX_LEAF_DISPLAY: usize = 15;

/// Resolves key paths against a single document.
pub struct Evaluator<'a> {
    root: &'a YamlValue,
}

impl<'a> Evaluator<'a> {
    pub fn new(root: &'a YamlValue) -> Self {
        Evaluator { root }
    }

    /// Walks the document one segment at a time.
    ///
    /// Sequences are indexed by signed integers, negative ones counting from
    /// the end. Mappings are indexed by exact key. Tags are transparent.
    pub fn resolve(&self, path: &KeyPath) -> Result<&'a YamlValue, TraversalError> {
        let mut current = self.root;
        for segment in path.iter() {
            current = step(current, segment)?;
        }
        Ok(current)
    }

    /// Like [`Evaluator::resolve`], substituting `default` for missing data.
    ///
    /// Only [`TraversalError::MissingKey`] and
    /// [`TraversalError::IndexOutOfRange`] are replaced; a path that does not
    /// fit the shape of the document is reported even when a default exists.
    pub fn resolve_or(
        &self,
        path: &KeyPath,
        default: Option<&str>,
    ) -> Result<Cow<'a, YamlValue>, TraversalError> {
        match (self.resolve(path), default) {
            (Ok(value), _) => Ok(Cow::Borrowed(value)),
            (Err(err), Some(default)) if err.is_missing_data() => {
                Ok(Cow::Owned(YamlValue::String(default.to_string())))
            }
            (Err(err), _) => Err(err),
        }
    }
}

/// Tokenizes `key`, resolves it against `doc` and reports failures as
/// [`InvalidPath`] errors naming the original key.
///
/// # Example
///
/// ```
/// use shyaml::document::node::{YamlNumber, YamlValue};
/// use shyaml::document::parser::parse_yaml_documents;
/// use shyaml::yamlpath::traverse;
///
/// let doc = parse_yaml_documents("a: {x: [1, 5]}").unwrap().remove(0);
/// let value = traverse(&doc, Some("a.x.-1"), None).unwrap();
/// assert_eq!(*value, YamlValue::Number(YamlNumber::Integer(5)));
///
/// let err = traverse(&doc, Some("a.y"), None).unwrap_err();
/// assert_eq!(err.to_string(), "invalid path 'a.y', missing key 'y' in struct.");
/// ```
pub fn traverse<'a>(
    doc: &'a YamlValue,
    key: Option<&str>,
    default: Option<&str>,
) -> Result<Cow<'a, YamlValue>, InvalidPath> {
    let path = tokenize(key);
    Evaluator::new(doc)
        .resolve_or(&path, default)
        .map_err(|cause| InvalidPath {
            path: key.unwrap_or_default().to_string(),
            cause,
        })
}

fn step<'a>(value: &'a YamlValue, segment: &str) -> Result<&'a YamlValue, TraversalError> {
    match value {
        YamlValue::Tagged(_, inner) => step(inner, segment),
        YamlValue::Sequence(items) => {
            let index = parse_index(segment)?;
            index
                .and_then(|index| normalize_index(index, items.len()))
                .map(|i| &items[i])
                .ok_or_else(|| TraversalError::IndexOutOfRange {
                    index: index.map_or_else(
                        || segment.trim().trim_start_matches('+').to_string(),
                        |index| index.to_string(),
                    ),
                    len: items.len(),
                })
        }
        YamlValue::Mapping(entries) => {
            entries
                .get(segment)
                .ok_or_else(|| TraversalError::MissingKey {
                    key: segment.to_string(),
                })
        }
        leaf => Err(TraversalError::NonTraversable {
            segment: segment.to_string(),
            leaf: leaf_display(leaf).filter(|text| text.chars().count() < MAX_LEAF_DISPLAY),
        }),
    }
}

/// Parses a sequence index; `None` for integers too large for any sequence.
fn parse_index(segment: &str) -> Result<Option<i128>, TraversalError> {
    match segment.trim().parse::<i128>() {
        Ok(index) => Ok(Some(index)),
        Err(err) if matches!(err.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Ok(None)
        }
        Err(_) => Err(TraversalError::IndexNotInteger {
            segment: segment.to_string(),
        }),
    }
}

/// Maps a possibly negative index onto `0..len`.
fn normalize_index(index: i128, len: usize) -> Option<usize> {
    let len = len as i128;
    let resolved = if index < 0 { len + index } else { index };
    (0..len).contains(&resolved).then_some(resolved as usize)
}

fn leaf_display(leaf: &YamlValue) -> Option<String> {
    match leaf {
        YamlValue::String(s) => Some(quote(s)),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Boolean(true) => Some("True".to_string()),
        YamlValue::Boolean(false) => Some("False".to_string()),
        YamlValue::Null => Some("None".to_string()),
        YamlValue::Tagged(_, inner) => leaf_display(inner),
        YamlValue::Mapping(_) | YamlValue::Sequence(_) => None,
    }
}
