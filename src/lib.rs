//! shyaml - query YAML documents from the shell.
//!
//! A key path such as `servers.0.name` selects a value in each document read
//! from the input, and an action decides what is printed about it: the value
//! itself, its type, its length, or its keys and values as newline or NUL
//! terminated records.

pub mod action;
pub mod config;
pub mod document;
pub mod file;
pub mod stream;
pub mod yamlpath;
