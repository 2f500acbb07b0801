//! Stdin -> file sink
//!
//! Reads stdin line by line and writes each line as one event. Bytes that
//! are not UTF-8 are replaced rather than ending the stream. EOF or Ctrl-C
//! drains the queue and closes the file before exiting.

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use spool_config::{Config, MirrorTarget, SinkConfig};
use spool_sinks::{ConsoleMirror, Diagnostics, FileSink, FileSinkConfig, Logger, TracingDiagnostics};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::Cli;

pub async fn run(cli: &Cli, config: &Config) -> Result<()> {
    let diagnostics = Arc::new(TracingDiagnostics::new(config.sink.diagnostic_interval));
    let sink = Arc::new(
        FileSink::builder(file_sink_config(&config.sink))
            .diagnostics(Arc::clone(&diagnostics) as Arc<dyn Diagnostics>)
            .build(),
    );
    let logger = build_logger(Arc::clone(&sink), &config.sink);

    tracing::debug!(
        path = %sink.path().display(),
        line_level = %cli.line_level,
        min_level = %logger.min_level(),
        "piping stdin"
    );

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut buf = Vec::new();
    let mut replaced = 0u64;

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        let read = tokio::select! {
            read = stdin.read_until(b'\n', &mut buf) => read,
            _ = &mut interrupted => {
                tracing::info!("interrupted, draining");
                break;
            }
        };

        match read {
            Ok(0) => break,
            Ok(_) => {
                {
                    let line = decode_line(&buf);
                    if matches!(line, Cow::Owned(_)) {
                        replaced += 1;
                    }
                    // Fire and forget; shutdown waits for everything queued
                    drop(logger.log(cli.line_level, &line));
                }
                buf.clear();
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to read stdin");
                break;
            }
        }
    }

    // A line cut short by Ctrl-C or a read error is still written
    if !buf.is_empty() {
        drop(logger.log(cli.line_level, &decode_line(&buf)));
    }

    sink.shutdown().await;

    let snapshot = sink.metrics();
    tracing::info!(
        events = snapshot.events_written,
        bytes = snapshot.bytes_written,
        rotations = snapshot.rotations,
        failures = diagnostics.total_reported(),
        lines_with_invalid_utf8 = replaced,
        "spool finished"
    );

    Ok(())
}

/// One raw stdin line without its terminator; invalid UTF-8 becomes U+FFFD
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}

fn file_sink_config(sink: &SinkConfig) -> FileSinkConfig {
    FileSinkConfig::default()
        .with_path(PathBuf::from(&sink.path))
        .with_max_file_size(sink.max_file_size)
        .with_backup_count(sink.backup_count)
        .with_persistent_handle(sink.persistent_handle)
        .with_diagnostic_interval(sink.diagnostic_interval)
}

fn build_logger(sink: Arc<FileSink>, config: &SinkConfig) -> Logger {
    let logger = Logger::new(sink).with_min_level(config.level);
    match config.mirror {
        MirrorTarget::None => logger,
        MirrorTarget::Stdout => logger.with_mirror(ConsoleMirror::stdout()),
        MirrorTarget::Stderr => logger.with_mirror(ConsoleMirror::stderr()),
    }
}
