//! Input and output of YAML text.
//!
//! [`loader`] reads YAML document streams and [`dumper`] renders query results.

pub mod dumper;
pub mod loader;
