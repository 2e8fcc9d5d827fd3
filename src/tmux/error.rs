// ABOUTME: Error types for the tmux session directory adapter
// Every variant here is fatal to the invocation that hit it

use thiserror::Error;

/// Failures reported by the session directory.
#[derive(Debug, Error)]
pub enum TmuxError {
    #[error("Tmux not installed on host")]
    TmuxNotInstalled,

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("tmux {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TmuxError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SessionNotFound(_))
    }
}
