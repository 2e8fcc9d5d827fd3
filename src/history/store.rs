// ABOUTME: File-backed persistence for the navigation history shared across invocations
// Advisory flock for read-modify-write, tmp file + atomic rename for every save

use crate::history::stack::HistoryStack;
use crate::models::SessionId;
use chrono::{DateTime, Utc};
use nix::errno::Errno;
use nix::fcntl::{flock, FlockArg};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

pub const HISTORY_FILE_VERSION: u32 = 1;

/// Failure to write the history file. Reads never fail; they degrade to empty.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// On-disk layout of the history file.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryFile {
    version: u32,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    /// Oldest first
    #[serde(default)]
    history: Vec<SessionId>,
}

/// The history file plus the lock file guarding it.
pub struct HistoryStore {
    path: PathBuf,
    lock_timeout: Duration,
    lock_poll: Duration,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout: Duration::from_millis(500),
            lock_poll: Duration::from_millis(20),
        }
    }

    /// Bounds how long [`HistoryStore::lock`] waits before giving up.
    pub fn with_lock_timing(mut self, timeout: Duration, poll: Duration) -> Self {
        self.lock_timeout = timeout;
        self.lock_poll = poll.max(Duration::from_millis(1));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// Takes the exclusive advisory lock guarding read-modify-write cycles.
    ///
    /// Returns `None` when the lock cannot be had within the configured bound
    /// or the lock file cannot be opened; callers then carry on unlocked with
    /// best-effort history.
    pub fn lock(&self) -> Option<HistoryLock> {
        match HistoryLock::acquire(&self.lock_path(), self.lock_timeout, self.lock_poll) {
            Ok(Some(lock)) => Some(lock),
            Ok(None) => {
                warn!(
                    "History lock {:?} still held after {:?}, continuing without it",
                    self.lock_path(),
                    self.lock_timeout
                );
                None
            }
            Err(e) => {
                warn!("Could not lock history {:?}: {}", self.lock_path(), e);
                None
            }
        }
    }

    /// Loads the stored stack. Missing, unreadable or malformed files load as
    /// an empty stack.
    pub fn load(&self) -> HistoryStack {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No history file at {:?}", self.path);
                return HistoryStack::new();
            }
            Err(e) => {
                warn!("Failed to read history file {:?}: {}", self.path, e);
                return HistoryStack::new();
            }
        };

        if content.trim().is_empty() {
            return HistoryStack::new();
        }

        let file: HistoryFile = match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                warn!("Discarding malformed history file {:?}: {}", self.path, e);
                return HistoryStack::new();
            }
        };

        if file.version != HISTORY_FILE_VERSION {
            warn!(
                "Discarding history file {:?} with unsupported version {}",
                self.path, file.version
            );
            return HistoryStack::new();
        }

        HistoryStack::from_entries(
            file.history
                .into_iter()
                .filter(|id| !id.as_str().is_empty()),
        )
    }

    /// Writes `stack` to a temporary file next to the history file and
    /// renames it into place, so readers see either the old or the new file.
    pub fn save(&self, stack: &HistoryStack) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let file = HistoryFile {
            version: HISTORY_FILE_VERSION,
            updated_at: Some(Utc::now()),
            history: stack.entries().to_vec(),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(tmp.as_file_mut(), &file)?;
        tmp.as_file_mut().write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!("Saved {} history entries to {:?}", stack.len(), self.path);
        Ok(())
    }
}

/// Exclusive advisory lock on the history's lock file, released on drop.
///
/// The lock file is never removed: unlinking it while another process waits
/// on the old inode would let two holders in at once.
#[derive(Debug)]
pub struct HistoryLock {
    _file: File,
}

impl HistoryLock {
    fn acquire(path: &Path, timeout: Duration, poll: Duration) -> io::Result<Option<Self>> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let deadline = Instant::now() + timeout;
        loop {
            match flock(file.as_raw_fd(), FlockArg::LockExclusiveNonblock) {
                Ok(()) => return Ok(Some(Self { _file: file })),
                Err(Errno::EINTR) => continue,
                Err(e) if e == Errno::EWOULDBLOCK => {
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                    thread::sleep(poll);
                }
                Err(e) => return Err(io::Error::from(e)),
            }
        }
    }
}
