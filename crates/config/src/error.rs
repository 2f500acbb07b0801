//! Errors raised while loading spool configuration
//!
//! Every variant names what the operator has to change: the file on disk,
//! its TOML, or the `[sink]` path (which `--path` can also supply).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed TOML, unknown enum value or unparseable level
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Neither the file nor the command line named a log file
    #[error("no log file configured: set [sink] path or pass --path")]
    MissingPath,

    /// The log file path cannot be opened as a regular file
    #[error("log file path '{path}' {reason}")]
    BadPath { path: String, reason: &'static str },
}
