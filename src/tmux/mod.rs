// ABOUTME: Host tmux adapter used as the session directory
// Lists live sessions, reports the active one, switches clients and kills sessions

pub mod client;
pub mod error;

pub use client::{SessionDirectory, TmuxClient};
pub use error::TmuxError;

#[cfg(test)]
pub use client::MockSessionDirectory;
