//! Configuration system for shyaml.
//!
//! Settings are read from `~/.config/shyaml/config.toml` and merged with the
//! command-line flags: a flag always turns its option on, the file only
//! changes the defaults.
//!
//! # Example
//!
//! ```
//! use shyaml::config::Config;
//!
//! let config: Config = toml::from_str("yaml_output = true").unwrap();
//! assert!(config.yaml_output);
//! assert!(!config.quiet);
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the shyaml command.
///
/// # Fields
///
/// * `yaml_output` - Render every result as YAML, like `-y` (default: false)
/// * `quiet` - Silence path and type errors, like `-q` (default: false)
/// * `line_buffer` - Read input line by line, like `-L` (default: false)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub yaml_output: bool,
    pub quiet: bool,
    pub line_buffer: bool,
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/shyaml/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("shyaml");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist, and logs a
    /// warning before doing so if it can't be read or parsed.
    pub fn load() -> Self {
        let config_path = match Self::config_path() {
            Some(path) => path,
            None => return Self::default(),
        };

        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_from(&config_path) {
            Ok(config) => {
                log::debug!("loaded configuration from {}", config_path.display());
                config
            }
            Err(err) => {
                log::warn!("ignoring configuration: {:#}", err);
                Self::default()
            }
        }
    }

    /// Loads configuration from `path`.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Turns on the options requested on the command line.
    pub fn with_flags(self, yaml_output: bool, quiet: bool, line_buffer: bool) -> Self {
        Self {
            yaml_output: self.yaml_output || yaml_output,
            quiet: self.quiet || quiet,
            line_buffer: self.line_buffer || line_buffer,
        }
    }
}
