// ABOUTME: Shared test doubles: an in-memory tmux and a scripted picker
// Lets integration tests drive the dispatcher end to end without a tmux server

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tempfile::TempDir;
use tmux_ws::dispatch::Dispatcher;
use tmux_ws::history::HistoryStore;
use tmux_ws::models::{LiveSessions, SessionId};
use tmux_ws::navigation::Navigator;
use tmux_ws::picker::{PickerError, Selector};
use tmux_ws::tmux::{SessionDirectory, TmuxError};

#[derive(Debug, Default)]
pub struct World {
    /// Most recently attached first
    pub live: Vec<String>,
    pub active: Option<String>,
    /// Every mutating call in order, e.g. "switch a", "destroy b"
    pub calls: Vec<String>,
}

impl World {
    pub fn external_destroy(&mut self, name: &str) {
        self.live.retain(|s| s != name);
        if self.active.as_deref() == Some(name) {
            self.active = self.live.first().cloned();
        }
    }
}

#[derive(Clone)]
pub struct FakeTmux {
    pub world: Rc<RefCell<World>>,
}

impl FakeTmux {
    pub fn new(live: &[&str], active: Option<&str>) -> Self {
        let world = World {
            live: live.iter().map(|s| s.to_string()).collect(),
            active: active.map(String::from),
            calls: Vec::new(),
        };
        Self {
            world: Rc::new(RefCell::new(world)),
        }
    }
}

impl SessionDirectory for FakeTmux {
    fn list_live_sessions(&self) -> Result<LiveSessions, TmuxError> {
        Ok(LiveSessions::from_ids(self.world.borrow().live.clone()))
    }

    fn active_session(&self) -> Result<Option<SessionId>, TmuxError> {
        Ok(self.world.borrow().active.clone().map(SessionId::from))
    }

    fn switch_to(&self, id: &SessionId) -> Result<(), TmuxError> {
        let mut world = self.world.borrow_mut();
        if !world.live.iter().any(|s| s == id.as_str()) {
            return Err(TmuxError::SessionNotFound(id.to_string()));
        }
        world.calls.push(format!("switch {}", id));
        world.active = Some(id.to_string());
        // Attaching moves the session to the front of the recency order
        world.live.retain(|s| s != id.as_str());
        world.live.insert(0, id.to_string());
        Ok(())
    }

    fn destroy(&self, id: &SessionId) -> Result<(), TmuxError> {
        let mut world = self.world.borrow_mut();
        if !world.live.iter().any(|s| s == id.as_str()) {
            return Err(TmuxError::SessionNotFound(id.to_string()));
        }
        world.calls.push(format!("destroy {}", id));
        world.live.retain(|s| s != id.as_str());
        if world.active.as_deref() == Some(id.as_str()) {
            world.active = None;
        }
        Ok(())
    }
}

/// Returns queued answers in order; cancels once the queue runs dry.
#[derive(Default)]
pub struct ScriptedSelector {
    answers: RefCell<VecDeque<Option<String>>>,
    pub prompts: RefCell<Vec<String>>,
}

impl ScriptedSelector {
    pub fn answering(answers: &[Option<&str>]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(|a| a.map(String::from)).collect()),
            prompts: RefCell::new(Vec::new()),
        }
    }
}

impl Selector for ScriptedSelector {
    fn select(
        &self,
        candidates: &[SessionId],
        prompt: &str,
    ) -> Result<Option<SessionId>, PickerError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        let answer = self.answers.borrow_mut().pop_front().flatten();
        Ok(answer.and_then(|name| candidates.iter().find(|c| c.as_str() == name).cloned()))
    }
}

pub fn history_store(dir: &TempDir) -> HistoryStore {
    HistoryStore::new(dir.path().join("history.json"))
}

pub fn navigator_dispatcher(
    tmux: &FakeTmux,
    selector: ScriptedSelector,
    dir: &TempDir,
    max_depth: usize,
) -> Dispatcher<FakeTmux, ScriptedSelector> {
    Dispatcher::new(tmux.clone(), selector, history_store(dir), Navigator::new(max_depth))
}

pub fn history_names(store: &HistoryStore) -> Vec<String> {
    store
        .load()
        .entries()
        .iter()
        .map(|id| id.to_string())
        .collect()
}
