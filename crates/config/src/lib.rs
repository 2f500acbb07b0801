//! Spool Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Only the sink path is required.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use spool_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[sink]\npath = \"logs/app.log\"").unwrap();
//! assert_eq!(config.sink.backup_count, 3);
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "info"
//! format = "text"
//! stream = "stderr"
//!
//! [sink]
//! path = "logs/app.log"
//! max_file_size = 5242880
//! backup_count = 3
//! persistent_handle = true
//! level = "info"
//! mirror = "none"
//! diagnostic_interval = "10s"
//! ```

mod diagnostics;
mod error;
mod level;
mod sink;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use diagnostics::{DiagnosticFormat, DiagnosticStream, DiagnosticsConfig};
pub use sink::{MirrorTarget, SinkConfig};

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diagnostic logging of spool itself
    pub log: DiagnosticsConfig,

    /// The rotating file sink
    pub sink: SinkConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration without validating it
    ///
    /// Lets callers fill in fields (e.g. from CLI flags) before calling
    /// [`validate`](Self::validate).
    pub fn parse_unvalidated(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    fn parse(s: &str) -> Result<Self> {
        let config = Self::parse_unvalidated(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
