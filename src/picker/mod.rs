// ABOUTME: Fuzzy selection front-end used by pick and kill
// Built-in skim finder by default, an external fzf-style command on request

pub mod command;
pub mod skim;

pub use command::CommandSelector;
pub use self::skim::SkimSelector;

use crate::config::{PickerBackend, PickerConfig};
use crate::models::SessionId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PickerError {
    #[error("Picker command not found: {0}")]
    NotInstalled(String),

    #[error("Picker exited with status {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("Invalid picker options: {0}")]
    Options(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Chooses one entry from an ordered candidate list.
pub trait Selector {
    /// Returns `None` when the user cancels.
    fn select(
        &self,
        candidates: &[SessionId],
        prompt: &str,
    ) -> Result<Option<SessionId>, PickerError>;
}

/// The selector named by `[picker] backend`.
pub enum ConfiguredSelector {
    Skim(SkimSelector),
    Command(CommandSelector),
}

impl ConfiguredSelector {
    pub fn from_config(config: &PickerConfig) -> Self {
        match config.backend {
            PickerBackend::Skim => Self::Skim(SkimSelector::new(config.height.clone())),
            PickerBackend::Command => Self::Command(CommandSelector::from_config(config)),
        }
    }
}

impl Selector for ConfiguredSelector {
    fn select(
        &self,
        candidates: &[SessionId],
        prompt: &str,
    ) -> Result<Option<SessionId>, PickerError> {
        match self {
            Self::Skim(selector) => selector.select(candidates, prompt),
            Self::Command(selector) => selector.select(candidates, prompt),
        }
    }
}

/// Maps the finder's output line back onto a candidate.
fn resolve(candidates: &[SessionId], choice: &str) -> Option<SessionId> {
    candidates.iter().find(|c| c.as_str() == choice).cloned()
}
