//! Actions applied to the value selected by a key path.
//!
//! | Action              | Accepts             | Output                       |
//! |---------------------|---------------------|------------------------------|
//! | `get-value`         | anything            | the value                    |
//! | `get-type`          | anything            | short type name              |
//! | `get-length`        | sequence, struct    | element count                |
//! | `get-values{,-0}`   | sequence, struct    | elements, or keys and values |
//! | `keys{,-0}`         | struct              | keys                         |
//! | `values{,-0}`       | struct              | values                       |
//! | `key-values{,-0}`   | struct              | key and value pairs          |
//!
//! List outputs are made of records, each terminated by a newline, or by a NUL
//! character for the `-0` variants.

use crate::document::node::YamlValue;
use crate::file::dumper::Dump;
use std::fmt;
use std::str::FromStr;

/// The shapes an action accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepts {
    Any,
    /// Sequences and mappings.
    Collection,
    /// Mappings only.
    Struct,
}

impl Accepts {
    /// Shape names listed in type mismatch errors.
    pub fn expected(self) -> &'static [&'static str] {
        match self {
            Accepts::Any => &[],
            Accepts::Collection => &["sequence", "struct"],
            Accepts::Struct => &["struct"],
        }
    }

    fn admits(self, value: &YamlValue) -> bool {
        match self {
            Accepts::Any => true,
            Accepts::Collection => !value.is_scalar(),
            Accepts::Struct => value.is_mapping(),
        }
    }
}

/// An action identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    GetValue,
    GetValues,
    GetValues0,
    GetType,
    GetLength,
    Keys,
    Keys0,
    Values,
    Values0,
    KeyValues,
    KeyValues0,
}

impl Action {
    pub const ALL: [Action; 11] = [
        Action::GetValue,
        Action::GetValues,
        Action::GetValues0,
        Action::GetType,
        Action::GetLength,
        Action::Keys,
        Action::Keys0,
        Action::Values,
        Action::Values0,
        Action::KeyValues,
        Action::KeyValues0,
    ];

    /// Actions whose output can be repeated for each document of a stream.
    pub const STREAMING: [Action; 3] = [Action::GetType, Action::GetLength, Action::GetValue];

    pub fn name(self) -> &'static str {
        match self {
            Action::GetValue => "get-value",
            Action::GetValues => "get-values",
            Action::GetValues0 => "get-values-0",
            Action::GetType => "get-type",
            Action::GetLength => "get-length",
            Action::Keys => "keys",
            Action::Keys0 => "keys-0",
            Action::Values => "values",
            Action::Values0 => "values-0",
            Action::KeyValues => "key-values",
            Action::KeyValues0 => "key-values-0",
        }
    }

    pub fn accepts(self) -> Accepts {
        match self {
            Action::GetValue | Action::GetType => Accepts::Any,
            Action::GetValues | Action::GetValues0 | Action::GetLength => Accepts::Collection,
            Action::Keys
            | Action::Keys0
            | Action::Values
            | Action::Values0
            | Action::KeyValues
            | Action::KeyValues0 => Accepts::Struct,
        }
    }

    /// Record terminator: NUL for the `-0` variants, newline otherwise.
    pub fn terminator(self) -> &'static str {
        match self {
            Action::GetValues0 | Action::Keys0 | Action::Values0 | Action::KeyValues0 => "\0",
            _ => "\n",
        }
    }

    pub fn supports_streaming(self) -> bool {
        Action::STREAMING.contains(&self)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = InvalidAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| InvalidAction(s.to_string()))
    }
}

/// An action identifier outside of the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAction(pub String);

impl fmt::Display for InvalidAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid action.", self.0)
    }
}

impl std::error::Error for InvalidAction {}

/// Errors raised while applying an action.
#[derive(Debug)]
pub enum ActionError {
    /// The selected value does not have a shape the action supports.
    UnsupportedType {
        action: Action,
        provided: String,
        expected: &'static [&'static str],
    },
    /// The value could not be serialized.
    Dump(serde_yaml::Error),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::UnsupportedType {
                action,
                provided,
                expected,
            } => {
                write!(
                    f,
                    "{} does not support '{}' type. Please provide or select a ",
                    action, provided
                )?;
                match expected.split_last() {
                    Some((last, [])) => write!(f, "{}.", last),
                    Some((last, rest)) => write!(f, "{} or {}.", rest.join(", "), last),
                    None => f.write_str("value."),
                }
            }
            ActionError::Dump(err) => write!(f, "could not serialize value: {}", err),
        }
    }
}

impl std::error::Error for ActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ActionError::Dump(err) => Some(err),
            ActionError::UnsupportedType { .. } => None,
        }
    }
}

impl From<serde_yaml::Error> for ActionError {
    fn from(err: serde_yaml::Error) -> Self {
        ActionError::Dump(err)
    }
}

/// Applies `action` to `value`, rendering values with `dumper`.
///
/// # Example
///
/// ```
/// use shyaml::action::{apply, Action};
/// use shyaml::document::parser::parse_yaml_documents;
/// use shyaml::file::dumper::DumpMode;
///
/// let doc = parse_yaml_documents("b: 1\na: 2\n").unwrap().remove(0);
/// assert_eq!(apply(Action::Keys, &doc, &DumpMode::Magic).unwrap(), "b\na\n");
/// assert_eq!(apply(Action::GetLength, &doc, &DumpMode::Magic).unwrap(), "2");
/// ```
pub fn apply<D: Dump + ?Sized>(
    action: Action,
    value: &YamlValue,
    dumper: &D,
) -> Result<String, ActionError> {
    let accepts = action.accepts();
    if !accepts.admits(value) {
        return Err(ActionError::UnsupportedType {
            action,
            provided: value.type_name().to_string(),
            expected: accepts.expected(),
        });
    }

    let terminator = action.terminator();
    let mut output = String::new();
    let mut record = |text: String| {
        output.push_str(&text);
        output.push_str(terminator);
    };

    match (action, value.untagged()) {
        (Action::GetValue, _) => return Ok(dumper.dump(value)?),
        (Action::GetType, _) => return Ok(value.type_name().to_string()),
        (Action::GetLength, inner) => return Ok(inner.len().unwrap_or_default().to_string()),
        (Action::GetValues | Action::GetValues0, YamlValue::Sequence(items)) => {
            for item in items {
                record(dumper.dump(item)?);
            }
        }
        (
            Action::GetValues | Action::GetValues0 | Action::KeyValues | Action::KeyValues0,
            YamlValue::Mapping(entries),
        ) => {
            for (key, item) in entries {
                record(dumper.dump(&key.to_value())?);
                record(dumper.dump(item)?);
            }
        }
        (Action::Keys | Action::Keys0, YamlValue::Mapping(entries)) => {
            for key in entries.keys() {
                record(dumper.dump(&key.to_value())?);
            }
        }
        (Action::Values | Action::Values0, YamlValue::Mapping(entries)) => {
            for item in entries.values() {
                record(dumper.dump(item)?);
            }
        }
        // Shapes were checked against `accepts` above.
        _ => unreachable!("{} applied to {}", action, value.type_name()),
    }

    Ok(output)
}
