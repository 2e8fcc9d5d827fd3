// ABOUTME: Pure decision logic for pick, back and kill over a snapshot of tmux state
// Computes what to do and the resulting history; performs no IO

use crate::history::HistoryStack;
use crate::models::{LiveSessions, SessionId};
use tracing::debug;

/// Everything the engine needs to decide, gathered fresh on each invocation.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    /// Sessions alive right now, most recently attached first
    pub live: LiveSessions,
    /// Session the invoking client sees; `None` outside tmux
    pub active: Option<SessionId>,
    /// Stack as loaded from disk, before pruning
    pub history: HistoryStack,
}

impl NavigationState {
    pub fn new(live: LiveSessions, active: Option<SessionId>, history: HistoryStack) -> Self {
        Self {
            live,
            active,
            history,
        }
    }

    fn is_active(&self, id: &SessionId) -> bool {
        self.active.as_ref() == Some(id)
    }
}

/// What must happen to the active client before a kill target is destroyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// The target is not the active session.
    NotNeeded,
    /// Switch here first, then destroy.
    SwitchTo(SessionId),
    /// The target is the last live session.
    NoSessionsRemain,
}

/// Multiplexer side effect of a command, applied by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    SwitchTo(SessionId),
    Destroy {
        target: SessionId,
        fallback: Fallback,
    },
}

/// Engine output: the action to apply and, if it differs from what was
/// loaded, the history to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    pub history: Option<HistoryStack>,
}

impl Decision {
    fn unchanged(action: Action) -> Self {
        Self {
            action,
            history: None,
        }
    }

    fn with_history(action: Action, before: &HistoryStack, after: HistoryStack) -> Self {
        let history = (after != *before).then_some(after);
        Self { action, history }
    }

    pub fn history_changed(&self) -> bool {
        self.history.is_some()
    }
}

/// Decides pick, back and kill; keeps history at most `max_depth` deep.
#[derive(Debug, Clone, Copy)]
pub struct Navigator {
    max_depth: usize,
}

impl Navigator {
    /// `max_depth` is clamped to at least one entry.
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    /// Handles a selection made from the live sessions. Switching records the
    /// session being left so `back` can return to it.
    pub fn pick(&self, state: &NavigationState, selection: Option<&SessionId>) -> Decision {
        let Some(target) = selection else {
            debug!("Pick cancelled");
            return Decision::unchanged(Action::None);
        };

        if state.is_active(target) {
            debug!("Picked the active session {}, nothing to do", target);
            return Decision::unchanged(Action::None);
        }

        if !state.live.contains(target) {
            debug!("Picked session {} is no longer live", target);
            return Decision::unchanged(Action::None);
        }

        let mut history = state.history.pruned(&state.live);
        if let Some(active) = &state.active {
            history.push(active.clone(), self.max_depth);
        }

        debug!("Pick: switching to {}", target);
        Decision::with_history(Action::SwitchTo(target.clone()), &state.history, history)
    }

    /// Returns to the most recent live session other than the active one,
    /// discarding it and everything recorded after it.
    pub fn back(&self, state: &NavigationState) -> Decision {
        let found = state
            .history
            .iter_recent()
            .find(|(_, id)| state.live.contains(id) && !state.is_active(id))
            .map(|(index, id)| (index, id.clone()));

        match found {
            Some((index, target)) => {
                let mut history = state.history.clone();
                history.truncate(index);
                history.prune(&state.live);
                debug!("Back: switching to {}", target);
                Decision::with_history(Action::SwitchTo(target), &state.history, history)
            }
            None => {
                debug!("Back: no live previous session");
                Decision::with_history(Action::None, &state.history, HistoryStack::new())
            }
        }
    }

    /// Plans destruction of `target`. When it is the active session a
    /// replacement is chosen first: the nearest live entry in history, else
    /// any other live session.
    pub fn kill(&self, state: &NavigationState, target: &SessionId) -> Decision {
        if !state.live.contains(target) {
            debug!("Kill: {} is already gone", target);
            let mut history = state.history.clone();
            history.remove_all(target);
            return Decision::with_history(Action::None, &state.history, history);
        }

        let mut history = state.history.pruned(&state.live);
        history.remove_all(target);

        let fallback = if state.is_active(target) {
            self.choose_fallback(state, target, &mut history)
        } else {
            Fallback::NotNeeded
        };

        debug!("Kill: destroying {} with fallback {:?}", target, fallback);
        let action = Action::Destroy {
            target: target.clone(),
            fallback,
        };
        Decision::with_history(action, &state.history, history)
    }

    /// `history` is already pruned and free of `target`.
    fn choose_fallback(
        &self,
        state: &NavigationState,
        target: &SessionId,
        history: &mut HistoryStack,
    ) -> Fallback {
        let from_history = history
            .iter_recent()
            .find(|(_, id)| *id != target && state.live.contains(id))
            .map(|(index, id)| (index, id.clone()));

        if let Some((index, id)) = from_history {
            history.truncate(index);
            return Fallback::SwitchTo(id);
        }

        match state.live.iter().find(|id| *id != target) {
            Some(id) => Fallback::SwitchTo(id.clone()),
            None => Fallback::NoSessionsRemain,
        }
    }
}
