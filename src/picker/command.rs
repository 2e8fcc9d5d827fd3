// ABOUTME: External fuzzy finder driven over stdin/stdout
// Optional backend for users who prefer fzf or another compatible tool

use super::{resolve, PickerError, Selector};
use crate::config::PickerConfig;
use crate::models::SessionId;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use tracing::debug;

/// [`Selector`] backed by `fzf` or any finder speaking the same protocol:
/// candidates on stdin, selection on stdout, exit 1 for no match and 130 for
/// abort.
pub struct CommandSelector {
    command: String,
    args: Vec<String>,
}

impl CommandSelector {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(config: &PickerConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }
}

impl Selector for CommandSelector {
    fn select(
        &self,
        candidates: &[SessionId],
        prompt: &str,
    ) -> Result<Option<SessionId>, PickerError> {
        if candidates.is_empty() {
            return Ok(None);
        }

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .arg(format!("--prompt={}", prompt))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => PickerError::NotInstalled(self.command.clone()),
                _ => PickerError::IoError(e),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let mut input = candidates
                .iter()
                .map(SessionId::as_str)
                .collect::<Vec<_>>()
                .join("\n");
            input.push('\n');
            match stdin.write_all(input.as_bytes()) {
                // The finder may exit before reading everything; its status decides
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!("Picker closed its input early");
                }
                result => result?,
            }
        }

        let output = child.wait_with_output()?;
        match output.status.code() {
            Some(0) => {}
            Some(1 | 130) => {
                debug!("Picker cancelled");
                return Ok(None);
            }
            code => {
                return Err(PickerError::Failed {
                    code,
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let choice = stdout.lines().next().unwrap_or("").trim_end_matches('\r');
        if choice.is_empty() {
            return Ok(None);
        }

        Ok(resolve(candidates, choice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<SessionId> {
        vec![SessionId::from("work"), SessionId::from("notes")]
    }

    fn shell(script: &str) -> CommandSelector {
        // `sh -c '<script>' --prompt=..`: the prompt lands in $0 and is ignored
        CommandSelector::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn test_missing_command() {
        let selector = CommandSelector::new("/nonexistent/fuzzy-finder", Vec::new());
        let err = selector.select(&candidates(), "> ").unwrap_err();
        assert!(matches!(err, PickerError::NotInstalled(_)));
    }

    #[test]
    fn test_empty_candidates_never_spawns() {
        let selector = CommandSelector::new("/nonexistent/fuzzy-finder", Vec::new());
        assert_eq!(selector.select(&[], "> ").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_selection_read_from_stdout() {
        let choice = shell("tail -n 1").select(&candidates(), "> ").unwrap();
        assert_eq!(choice, Some(SessionId::from("notes")));
    }

    #[cfg(unix)]
    #[test]
    fn test_abort_exit_code_is_cancel() {
        let selector = shell("cat >/dev/null; exit 130");
        assert_eq!(selector.select(&candidates(), "> ").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_unexpected_exit_code_is_error() {
        let selector = shell("cat >/dev/null; exit 2");
        let err = selector.select(&candidates(), "> ").unwrap_err();
        assert!(matches!(err, PickerError::Failed { code: Some(2), .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_finder_exiting_without_reading_input() {
        // BEHAVIOR: a finder that closes stdin early is judged by its exit
        // status, not by the failed write
        let many: Vec<SessionId> = (0..20_000)
            .map(|i| SessionId::from(format!("session-{i}")))
            .collect();

        let cancelled = shell("exit 130").select(&many, "> ").unwrap();
        assert_eq!(cancelled, None);

        let chosen = shell("echo session-7").select(&many, "> ").unwrap();
        assert_eq!(chosen, Some(SessionId::from("session-7")));
    }
}
