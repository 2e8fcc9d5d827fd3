// ABOUTME: Session directory trait and its tmux-backed implementation
// Shells out to the tmux binary for every query; holds no state of its own

use crate::models::{LiveSessions, SessionId, SessionInfo};
use crate::tmux::error::TmuxError;
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Format passed to `list-sessions -F`. The timestamp goes last so names
/// containing the separator still parse.
const LIST_FORMAT: &str = "#{session_name}|#{session_last_attached}";

/// Stderr printed when no server has been started yet. A socket that exists
/// but cannot be reached is a real failure, not an empty session list.
const NO_SERVER: &str = "no server running";
const CONNECT_ERROR: &str = "error connecting to";
const NO_SOCKET: &str = "No such file or directory";

/// Stderr fragments tmux prints when a target session does not exist.
const MISSING_SESSION_MARKERS: &[&str] = &["can't find session", "session not found"];

/// Operations the navigator needs from the terminal multiplexer.
#[cfg_attr(test, mockall::automock)]
pub trait SessionDirectory {
    /// All sessions currently alive, most recently attached first.
    fn list_live_sessions(&self) -> Result<LiveSessions, TmuxError>;

    /// The session the invoking client is attached to, if any.
    fn active_session(&self) -> Result<Option<SessionId>, TmuxError>;

    /// Makes `id` the visible session.
    fn switch_to(&self, id: &SessionId) -> Result<(), TmuxError>;

    /// Kills session `id`.
    fn destroy(&self, id: &SessionId) -> Result<(), TmuxError>;

    /// Whether `switch_to` holds the caller until the user detaches.
    fn switch_blocks(&self) -> bool {
        false
    }
}

/// [`SessionDirectory`] backed by the host `tmux` binary.
pub struct TmuxClient {
    binary: String,
    in_tmux: bool,
}

impl TmuxClient {
    /// Client for the `tmux` on `PATH`, switching clients when running
    /// inside tmux and attaching otherwise.
    pub fn new() -> Self {
        Self {
            binary: "tmux".to_string(),
            in_tmux: Self::is_in_tmux(),
        }
    }

    pub fn with_binary(binary: impl Into<String>, in_tmux: bool) -> Self {
        Self {
            binary: binary.into(),
            in_tmux,
        }
    }

    /// Check if this process was started from inside a tmux client
    pub fn is_in_tmux() -> bool {
        std::env::var_os("TMUX").is_some_and(|v| !v.is_empty())
    }

    fn run(&self, args: &[&str]) -> Result<Output, TmuxError> {
        debug!("Running {} {}", self.binary, args.join(" "));
        Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => TmuxError::TmuxNotInstalled,
                _ => TmuxError::IoError(e),
            })
    }

    fn exact_target(id: &SessionId) -> String {
        // "=" disables tmux's prefix matching so "api" never resolves to "api-old"
        format!("={}", id)
    }

    fn failure(command: &str, id: Option<&SessionId>, output: &Output) -> TmuxError {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        match id {
            Some(id) if contains_any(&stderr, MISSING_SESSION_MARKERS) => {
                TmuxError::SessionNotFound(id.to_string())
            }
            _ => TmuxError::CommandFailed {
                command: command.to_string(),
                stderr,
            },
        }
    }

    fn has_session(&self, id: &SessionId) -> Result<bool, TmuxError> {
        let target = Self::exact_target(id);
        let output = self.run(&["has-session", "-t", &target])?;
        Ok(output.status.success())
    }

    fn attach(&self, id: &SessionId) -> Result<(), TmuxError> {
        if !self.has_session(id)? {
            return Err(TmuxError::SessionNotFound(id.to_string()));
        }

        let target = Self::exact_target(id);
        let status = Command::new(&self.binary)
            .args(["attach-session", "-t", &target])
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        if !status.success() {
            return Err(TmuxError::CommandFailed {
                command: "attach-session".to_string(),
                stderr: format!("exited with {}", status),
            });
        }
        Ok(())
    }
}

impl Default for TmuxClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionDirectory for TmuxClient {
    fn list_live_sessions(&self) -> Result<LiveSessions, TmuxError> {
        let output = self.run(&["list-sessions", "-F", LIST_FORMAT])?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_no_server(&stderr) {
                debug!("No tmux server running, treating as zero sessions");
                return Ok(LiveSessions::default());
            }
            return Err(Self::failure("list-sessions", None, &output));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(LiveSessions::from_infos(parse_session_list(&stdout)))
    }

    fn active_session(&self) -> Result<Option<SessionId>, TmuxError> {
        if !self.in_tmux {
            return Ok(None);
        }

        let output = self.run(&["display-message", "-p", "#{session_name}"])?;
        if !output.status.success() {
            return Err(Self::failure("display-message", None, &output));
        }

        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!name.is_empty()).then(|| SessionId::from(name)))
    }

    fn switch_to(&self, id: &SessionId) -> Result<(), TmuxError> {
        if !self.in_tmux {
            return self.attach(id);
        }

        let target = Self::exact_target(id);
        let output = self.run(&["switch-client", "-t", &target])?;
        if !output.status.success() {
            return Err(Self::failure("switch-client", Some(id), &output));
        }
        Ok(())
    }

    fn destroy(&self, id: &SessionId) -> Result<(), TmuxError> {
        let target = Self::exact_target(id);
        let output = self.run(&["kill-session", "-t", &target])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Killing the last session takes the server down with it
            if is_no_server(&stderr) {
                return Err(TmuxError::SessionNotFound(id.to_string()));
            }
            return Err(Self::failure("kill-session", Some(id), &output));
        }
        Ok(())
    }

    fn switch_blocks(&self) -> bool {
        // Outside tmux switching means attach-session, which runs until detach
        !self.in_tmux
    }
}

fn is_no_server(stderr: &str) -> bool {
    stderr.contains(NO_SERVER) || (stderr.contains(CONNECT_ERROR) && stderr.contains(NO_SOCKET))
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Parses `list-sessions` output produced with [`LIST_FORMAT`].
pub fn parse_session_list(stdout: &str) -> Vec<SessionInfo> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let (name, attached) = line.rsplit_once('|')?;
            if name.is_empty() {
                return None;
            }
            Some(SessionInfo::new(name, attached.trim().parse().unwrap_or(0)))
        })
        .collect()
}
