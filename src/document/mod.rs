//! YAML document model and parsing.

pub mod node;
pub mod parser;
