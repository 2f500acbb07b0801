//! `[log]`: spool's own diagnostic output
//!
//! Sink failures, rotations and lifecycle events go through `tracing` to a
//! process stream. They never land in the log file being written.
//!
//! ```toml
//! [log]
//! level = "info"
//! filter = "spool_sinks=debug"   # optional, replaces `level`
//! format = "text"
//! stream = "stderr"
//! ```

use serde::Deserialize;
use spool_sinks::Level;

/// Rendering of diagnostic events
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticFormat {
    #[default]
    #[serde(alias = "console")]
    Text,
    Json,
}

/// Process stream diagnostics are written to
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticStream {
    Stdout,
    /// Keeps diagnostics apart from a mirrored stdout
    #[default]
    Stderr,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiagnosticsConfig {
    #[serde(deserialize_with = "crate::level::deserialize")]
    pub level: Level,

    /// Full `EnvFilter` directive; wins over `level` when set
    pub filter: Option<String>,

    pub format: DiagnosticFormat,

    #[serde(alias = "output")]
    pub stream: DiagnosticStream,
}

impl DiagnosticsConfig {
    /// Directive handed to the tracing subscriber
    pub fn filter_directive(&self) -> String {
        match &self.filter {
            Some(filter) if !filter.trim().is_empty() => filter.clone(),
            _ => self.level.as_str().to_ascii_lowercase(),
        }
    }
}
