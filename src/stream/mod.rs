//! Applying a query to every document of a YAML stream.
//!
//! [`run`] takes the parsed documents of a stream, resolves the key path in
//! each of them, applies the action and yields one output per document, in
//! document order. [`write_outputs`] frames those outputs on a writer.
//!
//! # Example
//!
//! ```
//! use shyaml::action::Action;
//! use shyaml::document::parser::parse_yaml_stream;
//! use shyaml::file::dumper::DumpMode;
//! use shyaml::stream::{run, write_outputs, Query};
//!
//! let query = Query::new(Action::GetType, Some("a"), None);
//! let documents = parse_yaml_stream("a: 1\n---\na: [2]\n");
//!
//! let mut out = Vec::new();
//! let count = write_outputs(&mut out, run(documents, &query, &DumpMode::Yaml), "---\n", false)
//!     .unwrap();
//! assert_eq!(count, 2);
//! assert_eq!(out, b"int---\nsequence");
//! ```

use crate::action::{apply, Action, ActionError};
use crate::document::node::YamlValue;
use crate::file::dumper::Dump;
use crate::yamlpath::{tokenize, Evaluator, InvalidPath, KeyPath};
use std::fmt;
use std::io::{self, Write};

/// An action, a key path and an optional default, parsed once per invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub action: Action,
    /// The key specification as given, used in error messages.
    pub key: Option<String>,
    pub path: KeyPath,
    /// Stands in for missing keys and out of range indexes.
    pub default: Option<String>,
}

impl Query {
    pub fn new(action: Action, key: Option<&str>, default: Option<&str>) -> Self {
        Self {
            action,
            key: key.map(str::to_string),
            path: tokenize(key),
            default: default.map(str::to_string),
        }
    }

    /// Resolves the key path in `document` and applies the action.
    pub fn execute<D: Dump + ?Sized>(
        &self,
        document: &YamlValue,
        dumper: &D,
    ) -> Result<String, QueryError> {
        let value = Evaluator::new(document)
            .resolve_or(&self.path, self.default.as_deref())
            .map_err(|cause| InvalidPath {
                path: self.key.clone().unwrap_or_default(),
                cause,
            })?;
        Ok(apply(self.action, &value, dumper)?)
    }
}

/// Failures while querying a stream.
#[derive(Debug)]
pub enum QueryError {
    InvalidPath(InvalidPath),
    Action(ActionError),
    /// A second document was found but the action only supports one.
    MultiDocumentUnsupported { action: Action },
    /// The input could not be read or parsed.
    Input(anyhow::Error),
    /// The output could not be written.
    Output(io::Error),
}

impl QueryError {
    /// Whether `--quiet` silences this error.
    ///
    /// Only path and type mismatch errors are silenced; the exit status is
    /// unaffected.
    pub fn is_quietable(&self) -> bool {
        matches!(
            self,
            QueryError::InvalidPath(_) | QueryError::Action(ActionError::UnsupportedType { .. })
        )
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::InvalidPath(err) => err.fmt(f),
            QueryError::Action(err) => err.fmt(f),
            QueryError::MultiDocumentUnsupported { action } => {
                let supported: Vec<&str> = Action::STREAMING.iter().map(|a| a.name()).collect();
                write!(
                    f,
                    "Source YAML is multi-document, which doesn't support any other action than {} (got {})",
                    supported.join(", "),
                    action
                )
            }
            QueryError::Input(err) => write!(f, "{:#}", err),
            QueryError::Output(err) => write!(f, "Failed to write output: {}", err),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::InvalidPath(err) => Some(err),
            QueryError::Action(err) => Some(err),
            QueryError::Output(err) => Some(err),
            QueryError::Input(err) => Some(&**err),
            QueryError::MultiDocumentUnsupported { .. } => None,
        }
    }
}

impl From<InvalidPath> for QueryError {
    fn from(err: InvalidPath) -> Self {
        QueryError::InvalidPath(err)
    }
}

impl From<ActionError> for QueryError {
    fn from(err: ActionError) -> Self {
        QueryError::Action(err)
    }
}

impl From<io::Error> for QueryError {
    fn from(err: io::Error) -> Self {
        QueryError::Output(err)
    }
}

/// Lazily applies `query` to each document.
///
/// A stream without any document is queried as a single null document. The
/// iterator stops after the first error.
pub fn run<'q, I, D>(documents: I, query: &'q Query, dumper: &'q D) -> Outputs<'q, I::IntoIter, D>
where
    I: IntoIterator<Item = anyhow::Result<YamlValue>>,
    D: Dump + ?Sized,
{
    Outputs {
        documents: documents.into_iter(),
        query,
        dumper,
        seen: 0,
        finished: false,
    }
}

/// Iterator returned by [`run`].
pub struct Outputs<'q, I, D: ?Sized> {
    documents: I,
    query: &'q Query,
    dumper: &'q D,
    seen: usize,
    finished: bool,
}

impl<'q, I, D> Outputs<'q, I, D>
where
    D: Dump + ?Sized,
{
    fn finish_on_error(&mut self, result: Result<String, QueryError>) -> Result<String, QueryError> {
        if result.is_err() {
            self.finished = true;
        }
        result
    }
}

impl<'q, I, D> Iterator for Outputs<'q, I, D>
where
    I: Iterator<Item = anyhow::Result<YamlValue>>,
    D: Dump + ?Sized,
{
    type Item = Result<String, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.documents.next() {
            Some(Ok(document)) => {
                self.seen += 1;
                let result = self.query.execute(&document, self.dumper);
                // Errors from the document itself take precedence.
                if result.is_ok() && self.seen > 1 && !self.query.action.supports_streaming() {
                    self.finished = true;
                    return Some(Err(QueryError::MultiDocumentUnsupported {
                        action: self.query.action,
                    }));
                }
                Some(self.finish_on_error(result))
            }
            Some(Err(err)) => {
                self.finished = true;
                Some(Err(QueryError::Input(err)))
            }
            None => {
                self.finished = true;
                if self.seen == 0 {
                    log::debug!("empty input, querying a null document");
                    Some(self.query.execute(&YamlValue::Null, self.dumper))
                } else {
                    None
                }
            }
        }
    }
}

/// Writes outputs in order, with `separator` between successive ones.
///
/// With `flush_each`, the writer is flushed after every output and separator
/// so that downstream readers see results as soon as they exist. Returns the
/// number of outputs written; on error, the outputs preceding it have
/// already been written.
pub fn write_outputs<W, I>(
    out: &mut W,
    outputs: I,
    separator: &str,
    flush_each: bool,
) -> Result<usize, QueryError>
where
    W: Write,
    I: IntoIterator<Item = Result<String, QueryError>>,
{
    let mut written = 0;
    for output in outputs {
        let output = match output {
            Ok(output) => output,
            Err(err) => {
                out.flush()?;
                return Err(err);
            }
        };
        if written > 0 {
            out.write_all(separator.as_bytes())?;
            if flush_each {
                out.flush()?;
            }
        }
        out.write_all(output.as_bytes())?;
        if flush_each {
            out.flush()?;
        }
        written += 1;
    }
    out.flush()?;
    Ok(written)
}
