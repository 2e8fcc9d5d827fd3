// ABOUTME: In-process fuzzy finder built on skim
// Takes over the terminal for one selection and hands back the chosen name

use super::{resolve, PickerError, Selector};
use crate::models::SessionId;
use skim::prelude::{SkimItemReader, SkimOptions, SkimOptionsBuilder};
use skim::{Skim, SkimItem};
use std::io::Cursor;
use tracing::debug;

/// [`Selector`] running skim inside this process.
pub struct SkimSelector {
    height: String,
}

impl SkimSelector {
    pub fn new(height: impl Into<String>) -> Self {
        Self {
            height: height.into(),
        }
    }

    fn options<'a>(&'a self, prompt: &'a str) -> Result<SkimOptions<'a>, PickerError> {
        SkimOptionsBuilder::default()
            .height(Some(self.height.as_str()))
            .multi(false)
            .color(Some("bw"))
            .layout("reverse")
            .prompt(Some(prompt))
            .build()
            .map_err(|e| PickerError::Options(e.to_string()))
    }
}

impl Default for SkimSelector {
    fn default() -> Self {
        Self::new("100%")
    }
}

impl Selector for SkimSelector {
    fn select(
        &self,
        candidates: &[SessionId],
        prompt: &str,
    ) -> Result<Option<SessionId>, PickerError> {
        if candidates.is_empty() {
            return Ok(None);
        }

        let options = self.options(prompt)?;
        let input = candidates
            .iter()
            .map(SessionId::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        let items = SkimItemReader::default().of_bufread(Cursor::new(input));

        let Some(output) = Skim::run_with(&options, Some(items)) else {
            debug!("Picker could not start");
            return Ok(None);
        };
        if output.is_abort {
            debug!("Picker cancelled");
            return Ok(None);
        }

        Ok(output
            .selected_items
            .first()
            .and_then(|item| resolve(candidates, &item.output())))
    }
}
