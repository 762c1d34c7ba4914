//! Evaluation settings.
//!
//! # Example YAML
//!
//! ```yaml
//! help: true
//! version: "naval_fate 2.0"
//! options_first: false
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Switches that control how an argument vector is evaluated.
///
/// # Examples
///
/// ```
/// use usage_grammar::EvalConfig;
///
/// let config = EvalConfig::default().with_version("2.0").with_options_first();
/// assert!(config.help);
/// assert_eq!(config.version.as_deref(), Some("2.0"));
/// assert!(config.options_first);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Answer `-h`/`--help` with the help text instead of matching.
    pub help: bool,
    /// Answer `--version` with this string. `None` disables the check.
    pub version: Option<String>,
    /// Treat everything after the first positional as positional.
    pub options_first: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            help: true,
            version: None,
            options_first: false,
        }
    }
}

impl EvalConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_options_first(mut self) -> Self {
        self.options_first = true;
        self
    }

    pub fn without_help(mut self) -> Self {
        self.help = false;
        self
    }
}
