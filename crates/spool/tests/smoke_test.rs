//! End-to-end runs of the spool binary

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn run_spool(args: &[&str], input: impl AsRef<[u8]>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_spool"))
        .args(args)
        .env_remove("SPOOL_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_ref())
        .unwrap();

    child.wait_with_output().unwrap()
}

fn lines_of(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_pipes_stdin_lines_in_order() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("nested").join("app.log");

    let output = run_spool(
        &["--path", log.to_str().unwrap()],
        "first\nsecond\nthird\n",
    );
    assert!(output.status.success(), "{output:?}");

    let lines = lines_of(&log);
    assert_eq!(lines.len(), 3);
    for (line, expected) in lines.iter().zip(["first", "second", "third"]) {
        assert!(line.ends_with(&format!(" [INFO] {expected}")), "{line}");
    }
}

#[test]
fn test_invalid_utf8_does_not_stop_the_pipe() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("app.log");

    let output = run_spool(
        &["--path", log.to_str().unwrap()],
        b"one\nbad \xff byte\nthree\nfour\n",
    );
    assert!(output.status.success(), "{output:?}");

    let lines = lines_of(&log);
    assert_eq!(lines.len(), 4, "{lines:?}");
    assert!(lines[1].ends_with(" [INFO] bad \u{FFFD} byte"), "{}", lines[1]);
    assert!(lines[3].ends_with(" [INFO] four"));
}

#[test]
fn test_unterminated_last_line_is_written() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("app.log");

    let output = run_spool(&["--path", log.to_str().unwrap()], "first\ntail");
    assert!(output.status.success(), "{output:?}");

    let lines = lines_of(&log);
    assert_eq!(lines.len(), 2);
    assert!(lines[1].ends_with(" [INFO] tail"));
}

#[test]
fn test_rotates_into_bounded_chain() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("app.log");
    let input: String = (0..50).map(|i| format!("line number {i:03}\n")).collect();

    let output = run_spool(
        &[
            "--path",
            log.to_str().unwrap(),
            "--max-file-size",
            "200",
            "--backup-count",
            "2",
        ],
        &input,
    );
    assert!(output.status.success(), "{output:?}");

    assert!(log.exists());
    assert!(dir.path().join("app.log.1").exists());
    assert!(dir.path().join("app.log.2").exists());
    assert!(!dir.path().join("app.log.3").exists());

    let live = lines_of(&log);
    if let Some(last) = live.last() {
        assert!(last.ends_with("line number 049"), "{last}");
    }
}

#[test]
fn test_line_level_and_per_write() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("app.log");

    let output = run_spool(
        &[
            "--path",
            log.to_str().unwrap(),
            "--per-write",
            "--line-level",
            "warn",
        ],
        "disk almost full\n",
    );
    assert!(output.status.success(), "{output:?}");

    let lines = lines_of(&log);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(" [WARN] disk almost full"));
}

#[test]
fn test_config_file_with_cli_override() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("spool.toml");
    let from_config = dir.path().join("from_config.log");
    let from_cli = dir.path().join("from_cli.log");

    fs::write(
        &config_path,
        format!(
            "[sink]\npath = {:?}\nbackup_count = 1\n",
            from_config.to_str().unwrap()
        ),
    )
    .unwrap();

    let output = run_spool(
        &[
            "--config",
            config_path.to_str().unwrap(),
            "--path",
            from_cli.to_str().unwrap(),
        ],
        "hello\n",
    );
    assert!(output.status.success(), "{output:?}");

    assert!(!from_config.exists());
    assert_eq!(lines_of(&from_cli).len(), 1);
}

#[test]
fn test_missing_path_is_rejected() {
    let output = run_spool(&[], "ignored\n");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("path"), "{stderr}");
}
