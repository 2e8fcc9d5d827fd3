// ABOUTME: Command dispatcher wiring tmux, the picker, the history store and the engine
// Owns side-effect ordering: act on tmux first, persist history only afterwards

use crate::config::AppConfig;
use crate::history::{HistoryLock, HistoryStack, HistoryStore};
use crate::models::{LiveSessions, SessionId};
use crate::navigation::{Action, Decision, Fallback, NavigationState, Navigator};
use crate::picker::{ConfiguredSelector, PickerError, Selector};
use crate::tmux::{SessionDirectory, TmuxClient, TmuxError};
use thiserror::Error;
use tracing::{debug, info, warn};

const PICK_PROMPT: &str = "> ";
const KILL_PROMPT: &str = "kill> ";

/// One invocation of the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pick,
    Kill(KillTarget),
    Back,
    /// Read-only listing of the pruned history
    History,
}

/// Which session `kill` acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillTarget {
    /// Ask the picker which session to kill
    Choose,
    /// The session this client is attached to
    Current,
    Named(SessionId),
}

/// What an invocation did, for reporting to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NoOp,
    Switched(SessionId),
    Killed {
        target: SessionId,
        switched_to: Option<SessionId>,
    },
    /// The killed session was the last one alive
    NoSessionsRemain {
        target: SessionId,
    },
    NothingToKill,
    /// Most recent first
    History(Vec<SessionId>),
}

/// Failures that abort an invocation with a non-zero exit.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Tmux(#[from] TmuxError),

    #[error(transparent)]
    Picker(#[from] PickerError),

    #[error("Not attached to a tmux session")]
    NoActiveSession,
}

/// Runs commands against a session directory, a selector and the history store.
pub struct Dispatcher<D, S> {
    directory: D,
    selector: S,
    store: HistoryStore,
    navigator: Navigator,
}

impl Dispatcher<TmuxClient, ConfiguredSelector> {
    pub fn from_config(config: &AppConfig) -> Self {
        let store = HistoryStore::new(config.history.path())
            .with_lock_timing(config.history.lock_timeout(), config.history.lock_poll());
        Self::new(
            TmuxClient::new(),
            ConfiguredSelector::from_config(&config.picker),
            store,
            Navigator::new(config.history.max_depth),
        )
    }
}

impl<D: SessionDirectory, S: Selector> Dispatcher<D, S> {
    pub fn new(directory: D, selector: S, store: HistoryStore, navigator: Navigator) -> Self {
        Self {
            directory,
            selector,
            store,
            navigator,
        }
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn run(&self, command: Command) -> Result<Outcome, DispatchError> {
        info!("Running {:?}", command);
        let outcome = match command {
            Command::Pick => self.pick(),
            Command::Kill(target) => self.kill(target),
            Command::Back => self.back(),
            Command::History => self.history(),
        }?;
        info!("Outcome: {:?}", outcome);
        Ok(outcome)
    }

    fn pick(&self) -> Result<Outcome, DispatchError> {
        // The picker can sit on user input indefinitely, so it runs before
        // the history lock is taken.
        let live = self.directory.list_live_sessions()?;
        let Some(selection) = self.selector.select(live.as_slice(), PICK_PROMPT)? else {
            return Ok(Outcome::NoOp);
        };

        let lock = self.store.lock();
        let state = self.load_state()?;
        let decision = self.navigator.pick(&state, Some(&selection));
        self.finish(decision, lock)
    }

    fn back(&self) -> Result<Outcome, DispatchError> {
        let lock = self.store.lock();
        let state = self.load_state()?;
        let decision = self.navigator.back(&state);
        self.finish(decision, lock)
    }

    fn kill(&self, target: KillTarget) -> Result<Outcome, DispatchError> {
        let target = match target {
            KillTarget::Named(id) => id,
            KillTarget::Current => self
                .directory
                .active_session()?
                .ok_or(DispatchError::NoActiveSession)?,
            KillTarget::Choose => {
                let live = self.directory.list_live_sessions()?;
                if live.is_empty() {
                    return Ok(Outcome::NothingToKill);
                }
                match self.selector.select(live.as_slice(), KILL_PROMPT)? {
                    Some(id) => id,
                    None => return Ok(Outcome::NoOp),
                }
            }
        };

        let lock = self.store.lock();
        let state = self.load_state()?;
        let decision = self.navigator.kill(&state, &target);
        self.finish(decision, lock)
    }

    fn history(&self) -> Result<Outcome, DispatchError> {
        let live = self.directory.list_live_sessions()?;
        let history = self.store.load().pruned(&live);
        let recent = history.iter_recent().map(|(_, id)| id.clone()).collect();
        Ok(Outcome::History(recent))
    }

    fn load_state(&self) -> Result<NavigationState, TmuxError> {
        let live: LiveSessions = self.directory.list_live_sessions()?;
        let active = self.directory.active_session()?;
        let history: HistoryStack = self.store.load();
        debug!(
            "State: {} live, active {:?}, {} history entries",
            live.len(),
            active,
            history.len()
        );
        Ok(NavigationState::new(live, active, history))
    }

    /// Applies the action, then persists history. An adapter failure returns
    /// before anything is written.
    ///
    /// A switch that blocks until detach is the exception: history is saved
    /// and the lock released first, so invocations made from inside the
    /// attached session are neither locked out nor overwritten afterwards.
    fn finish(
        &self,
        decision: Decision,
        lock: Option<HistoryLock>,
    ) -> Result<Outcome, DispatchError> {
        if Self::switches(&decision.action) && self.directory.switch_blocks() {
            // Attach lasts until detach; commands run inside it need the lock
            self.persist(decision.history);
            drop(lock);
            return Ok(self.apply(&decision.action)?);
        }

        let outcome = self.apply(&decision.action)?;
        self.persist(decision.history);
        drop(lock);
        Ok(outcome)
    }

    fn switches(action: &Action) -> bool {
        matches!(
            action,
            Action::SwitchTo(_)
                | Action::Destroy {
                    fallback: Fallback::SwitchTo(_),
                    ..
                }
        )
    }

    fn apply(&self, action: &Action) -> Result<Outcome, TmuxError> {
        match action {
            Action::None => Ok(Outcome::NoOp),
            Action::SwitchTo(id) => {
                self.directory.switch_to(id)?;
                Ok(Outcome::Switched(id.clone()))
            }
            Action::Destroy { target, fallback } => {
                // A replacement must be active before the current session goes away
                if let Fallback::SwitchTo(next) = fallback {
                    self.directory.switch_to(next)?;
                }

                match self.directory.destroy(target) {
                    Ok(()) => {}
                    Err(e) if e.is_not_found() => debug!("{} vanished before kill", target),
                    Err(e) => return Err(e),
                }

                Ok(match fallback {
                    Fallback::NotNeeded => Outcome::Killed {
                        target: target.clone(),
                        switched_to: None,
                    },
                    Fallback::SwitchTo(next) => Outcome::Killed {
                        target: target.clone(),
                        switched_to: Some(next.clone()),
                    },
                    Fallback::NoSessionsRemain => Outcome::NoSessionsRemain {
                        target: target.clone(),
                    },
                })
            }
        }
    }

    fn persist(&self, history: Option<HistoryStack>) {
        let Some(history) = history else {
            debug!("History unchanged, skipping write");
            return;
        };
        if let Err(e) = self.store.save(&history) {
            warn!("Failed to save history to {:?}: {}", self.store.path(), e);
        }
    }
}
