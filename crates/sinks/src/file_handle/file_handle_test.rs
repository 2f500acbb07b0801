//! Tests for the file handle manager

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::*;
use tempfile::TempDir;

fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(|| "2025-01-15T10:30:45.123Z".to_string())
}

/// Clock that hands out 0, 1, 2, ... so tests can see when stamps were taken
fn counting_clock() -> (Arc<dyn Clock>, Arc<AtomicU64>) {
    let counter = Arc::new(AtomicU64::new(0));
    let c = Arc::clone(&counter);
    let clock: Arc<dyn Clock> = Arc::new(move || c.fetch_add(1, Ordering::SeqCst).to_string());
    (clock, counter)
}

// =============================================================================
// Line format
// =============================================================================

#[test]
fn test_lines_are_timestamped_and_newline_terminated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    let mut manager = FileHandleManager::new(&path, HandleMode::Persistent, fixed_clock());

    let stats = manager.append_lines(&["hello", "world"]).unwrap();
    manager.flush().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "2025-01-15T10:30:45.123Z hello\n2025-01-15T10:30:45.123Z world\n"
    );
    assert_eq!(stats.lines, 2);
    assert_eq!(stats.bytes, content.len() as u64);
}

#[test]
fn test_each_line_gets_its_own_timestamp() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    let (clock, counter) = counting_clock();
    let mut manager = FileHandleManager::new(&path, HandleMode::Persistent, clock);

    manager.append_lines(&["a", "b", "c"]).unwrap();
    manager.flush().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "0 a\n1 b\n2 c\n");
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[test]
fn test_empty_event_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    let mut manager = FileHandleManager::new(&path, HandleMode::Persistent, fixed_clock());

    let stats = manager.append_lines::<&str>(&[]).unwrap();
    manager.flush().unwrap();

    assert_eq!(stats, AppendStats::default());
    assert_eq!(manager.current_size().unwrap(), 0);
}

// =============================================================================
// Persistent mode
// =============================================================================

#[test]
fn test_persistent_reuses_handle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    let mut manager = FileHandleManager::new(&path, HandleMode::Persistent, fixed_clock());

    assert!(!manager.is_open());
    manager.ensure_open().unwrap();
    assert!(manager.is_open());

    manager.append_lines(&["one"]).unwrap();
    manager.append_lines(&["two"]).unwrap();
    manager.flush().unwrap();
    assert!(manager.is_open());

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
}

#[test]
fn test_persistent_appends_to_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, "existing\n").unwrap();

    let mut manager = FileHandleManager::new(&path, HandleMode::Persistent, fixed_clock());
    manager.append_lines(&["new"]).unwrap();
    manager.close().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("existing\n"));
    assert!(content.ends_with(" new\n"));
}

#[test]
fn test_close_flushes_and_releases() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    let mut manager = FileHandleManager::new(&path, HandleMode::Persistent, fixed_clock());

    manager.append_lines(&["buffered"]).unwrap();
    manager.close().unwrap();

    assert!(!manager.is_open());
    assert!(fs::read_to_string(&path).unwrap().contains("buffered"));

    // Second close is a no-op
    manager.close().unwrap();
}

#[test]
fn test_append_opens_persistent_handle_on_demand() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    let mut manager = FileHandleManager::new(&path, HandleMode::Persistent, fixed_clock());

    assert!(!manager.is_open());
    manager.append_lines(&["first"]).unwrap();
    assert!(manager.is_open());

    manager.flush().unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "2025-01-15T10:30:45.123Z first\n"
    );
}

#[test]
fn test_reopens_after_file_deleted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    let mut manager = FileHandleManager::new(&path, HandleMode::Persistent, fixed_clock());

    manager.append_lines(&["before"]).unwrap();
    manager.flush().unwrap();

    fs::remove_file(&path).unwrap();

    manager.append_lines(&["after"]).unwrap();
    manager.flush().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "2025-01-15T10:30:45.123Z after\n");
}

#[cfg(unix)]
#[test]
fn test_reopens_after_file_replaced() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    let moved = dir.path().join("moved.log");
    let mut manager = FileHandleManager::new(&path, HandleMode::Persistent, fixed_clock());

    manager.append_lines(&["old"]).unwrap();
    manager.flush().unwrap();

    // External rotation: move the file away and drop an empty one in place
    fs::rename(&path, &moved).unwrap();
    fs::write(&path, "").unwrap();

    manager.append_lines(&["new"]).unwrap();
    manager.flush().unwrap();

    assert_eq!(
        fs::read_to_string(&moved).unwrap(),
        "2025-01-15T10:30:45.123Z old\n"
    );
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "2025-01-15T10:30:45.123Z new\n"
    );
}

// =============================================================================
// Per-write mode
// =============================================================================

#[test]
fn test_per_write_never_holds_handle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    let mut manager = FileHandleManager::new(&path, HandleMode::PerWrite, fixed_clock());

    manager.ensure_open().unwrap();
    assert!(!manager.is_open());

    manager.append_lines(&["one"]).unwrap();
    assert!(!manager.is_open());

    // Already on disk without an explicit flush
    assert!(fs::read_to_string(&path).unwrap().contains("one"));

    manager.append_lines(&["two"]).unwrap();
    manager.close().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
}

// =============================================================================
// Directories and sizes
// =============================================================================

#[test]
fn test_creates_parent_directories_lazily() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("app.log");
    let mut manager = FileHandleManager::new(&path, HandleMode::Persistent, fixed_clock());

    assert!(!path.parent().unwrap().exists());
    manager.append_lines(&["x"]).unwrap();
    manager.close().unwrap();

    assert!(path.exists());
}

#[test]
fn test_current_size_reads_filesystem() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    let manager = FileHandleManager::new(&path, HandleMode::Persistent, fixed_clock());

    assert_eq!(manager.current_size().unwrap(), 0);

    fs::write(&path, vec![b'x'; 42]).unwrap();
    assert_eq!(manager.current_size().unwrap(), 42);
}

#[test]
fn test_open_failure_is_returned() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not_a_dir");
    fs::write(&blocker, "file").unwrap();
    let path = blocker.join("app.log");

    let mut manager = FileHandleManager::new(&path, HandleMode::Persistent, fixed_clock());
    let err = manager.append_lines(&["x"]).unwrap_err();

    assert_eq!(err.kind(), "create_dir");
    assert!(!manager.is_open());
}

#[test]
fn test_mode_from_persistent_flag() {
    assert_eq!(HandleMode::from_persistent(true), HandleMode::Persistent);
    assert_eq!(HandleMode::from_persistent(false), HandleMode::PerWrite);
    assert_eq!(HandleMode::default(), HandleMode::Persistent);
}
