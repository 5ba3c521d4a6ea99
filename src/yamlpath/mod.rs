//! Key paths: dotted, escapable selectors into a YAML document.
//!
//! # Syntax
//!
//! - `a.b` - entry `b` of the mapping under `a`
//! - `items.0`, `items.-1` - first and last element of a sequence
//! - `a\.b` - the key `a.b`; `a\\b` - the key `a\b`
//! - `a..b` - entry `b` under the empty key `""` of `a`
//!
//! There are no wildcards or filters: every segment is a literal key or an
//! integer index.

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod parser;

pub use ast::KeyPath;
pub use error::{InvalidPath, TraversalError};
pub use evaluator::{traverse, Evaluator};
pub use parser::{escape, tokenize, Parser};
