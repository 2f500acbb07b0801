//! Application-facing logger over a [`FileSink`]
//!
//! The sink only knows about lines. Deciding which severities are written,
//! turning a message into lines and echoing them to a console are separate
//! collaborators plugged in here:
//!
//! - [`Level`] and a minimum level gate
//! - [`LineFormatter`]: message -> [`LogEvent`]
//! - [`Mirror`]: optional secondary destination
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use spool_sinks::{FileSink, FileSinkConfig, Level, Logger, ConsoleMirror};
//!
//! let sink = Arc::new(FileSink::new(FileSinkConfig::default()));
//! let logger = Logger::new(Arc::clone(&sink))
//!     .with_min_level(Level::Info)
//!     .with_mirror(ConsoleMirror::stderr());
//!
//! logger.info("listening on 0.0.0.0:8080");
//! logger.debug("dropped, below the gate");
//!
//! sink.shutdown().await;
//! ```

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Arc;

use crate::event::LogEvent;
use crate::file_sink::FileSink;
use crate::queue::WriteCompletion;

/// Message severity, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised level name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}'")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Turns a message into the lines handed to the sink
pub trait LineFormatter: Send + Sync {
    fn format(&self, level: Level, message: &str) -> LogEvent;
}

/// `[LEVEL] text`, one line per line of the message
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelPrefixFormatter;

impl LineFormatter for LevelPrefixFormatter {
    fn format(&self, level: Level, message: &str) -> LogEvent {
        let tag = level.as_str();
        if message.is_empty() {
            return LogEvent::line(format!("[{tag}]"));
        }
        LogEvent::new(message.lines().map(|line| format!("[{tag}] {line}")))
    }
}

/// Secondary destination that sees every event that passes the gate
pub trait Mirror: Send + Sync {
    fn mirror(&self, level: Level, event: &LogEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleTarget {
    Stdout,
    Stderr,
}

/// Echoes formatted lines to stdout or stderr
#[derive(Debug, Clone, Copy)]
pub struct ConsoleMirror {
    target: ConsoleTarget,
}

impl ConsoleMirror {
    pub fn stdout() -> Self {
        Self {
            target: ConsoleTarget::Stdout,
        }
    }

    pub fn stderr() -> Self {
        Self {
            target: ConsoleTarget::Stderr,
        }
    }

    fn write_lines(out: &mut dyn Write, event: &LogEvent) -> io::Result<()> {
        for line in event.lines() {
            writeln!(out, "{line}")?;
        }
        out.flush()
    }
}

impl Mirror for ConsoleMirror {
    fn mirror(&self, _level: Level, event: &LogEvent) {
        // Console trouble must not affect the file path
        let _ = match self.target {
            ConsoleTarget::Stdout => Self::write_lines(&mut io::stdout().lock(), event),
            ConsoleTarget::Stderr => Self::write_lines(&mut io::stderr().lock(), event),
        };
    }
}

/// Level-gated, formatted front end for a shared [`FileSink`]
pub struct Logger {
    sink: Arc<FileSink>,
    min_level: Level,
    formatter: Box<dyn LineFormatter>,
    mirror: Option<Box<dyn Mirror>>,
}

impl Logger {
    pub fn new(sink: Arc<FileSink>) -> Self {
        Self {
            sink,
            min_level: Level::default(),
            formatter: Box::new(LevelPrefixFormatter),
            mirror: None,
        }
    }

    #[must_use]
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: impl LineFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    #[must_use]
    pub fn with_mirror(mut self, mirror: impl Mirror + 'static) -> Self {
        self.mirror = Some(Box::new(mirror));
        self
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    /// Format and queue a message
    ///
    /// Returns `None` when the level is filtered out.
    pub fn log(&self, level: Level, message: &str) -> Option<WriteCompletion> {
        if !self.enabled(level) {
            return None;
        }

        let event = self.formatter.format(level, message);
        if let Some(mirror) = &self.mirror {
            mirror.mirror(level, &event);
        }
        Some(self.sink.write(event))
    }

    pub fn trace(&self, message: &str) -> Option<WriteCompletion> {
        self.log(Level::Trace, message)
    }

    pub fn debug(&self, message: &str) -> Option<WriteCompletion> {
        self.log(Level::Debug, message)
    }

    pub fn info(&self, message: &str) -> Option<WriteCompletion> {
        self.log(Level::Info, message)
    }

    pub fn warn(&self, message: &str) -> Option<WriteCompletion> {
        self.log(Level::Warn, message)
    }

    pub fn error(&self, message: &str) -> Option<WriteCompletion> {
        self.log(Level::Error, message)
    }
}
