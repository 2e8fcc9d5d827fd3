// ABOUTME: Tests for the history file store across concurrent invocations
// Simulates rapid hotkey presses as threads sharing one history file

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use tmux_ws::history::{HistoryStack, HistoryStore};

fn store(dir: &TempDir) -> HistoryStore {
    HistoryStore::new(dir.path().join("history.json"))
        .with_lock_timing(Duration::from_secs(10), Duration::from_millis(1))
}

#[test]
fn test_round_trip() {
    // BEHAVIOR: save followed by load yields the same stack
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    let stack = HistoryStack::from_entries(["main", "notes", "scratch pad", "main"]);

    store.save(&stack).unwrap();

    assert_eq!(store.load(), stack);
}

#[test]
fn test_save_replaces_previous_content() {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);

    store.save(&HistoryStack::from_entries(["a", "b", "c"])).unwrap();
    store.save(&HistoryStack::from_entries(["d"])).unwrap();

    assert_eq!(store.load(), HistoryStack::from_entries(["d"]));
}

#[test]
fn test_truncated_file_loads_empty() {
    // BEHAVIOR: a damaged file is treated as empty history, not an error
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    std::fs::write(store.path(), r#"{"version": 1, "history": ["a", "#).unwrap();

    assert!(store.load().is_empty());
}

#[test]
fn test_locked_read_modify_write_loses_no_updates() {
    // BEHAVIOR: concurrent invocations serialise through the lock
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(store(&temp_dir));
    let threads = 6;
    let per_thread = 15;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..per_thread {
                    let lock = store.lock();
                    assert!(lock.is_some());
                    let mut history = store.load();
                    history.push(format!("t{}-{}", t, i).into(), usize::MAX);
                    store.save(&history).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.load().len(), threads * per_thread);
}

#[test]
fn test_contended_lock_gives_up_within_bound() {
    // BEHAVIOR: a held lock makes others proceed unlocked instead of hanging
    let temp_dir = TempDir::new().unwrap();
    let holder = store(&temp_dir);
    let impatient = HistoryStore::new(temp_dir.path().join("history.json"))
        .with_lock_timing(Duration::from_millis(30), Duration::from_millis(5));

    let _held = holder.lock().unwrap();

    assert!(impatient.lock().is_none());
    impatient.save(&HistoryStack::from_entries(["a"])).unwrap();
    assert_eq!(impatient.load(), HistoryStack::from_entries(["a"]));
}
