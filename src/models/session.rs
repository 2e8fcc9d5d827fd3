// ABOUTME: Session identifier and live-session models reported by the multiplexer
// Ids are only meaningful while live; a destroyed name may later be reused

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque tmux session name.
///
/// Unique among live sessions at any instant but not stable over time: a
/// recorded id is only a valid switch target if it is currently live.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SessionId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A live session as listed by `tmux list-sessions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: SessionId,
    /// Unix timestamp of the last client attach, 0 if never attached
    pub last_attached: i64,
}

impl SessionInfo {
    pub fn new(id: impl Into<SessionId>, last_attached: i64) -> Self {
        Self {
            id: id.into(),
            last_attached,
        }
    }
}

/// The set of sessions the multiplexer currently reports, most recently
/// attached first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveSessions {
    ordered: Vec<SessionId>,
}

impl LiveSessions {
    /// Builds the set from listed sessions, newest attach first. Ties keep the
    /// listing order.
    pub fn from_infos(mut infos: Vec<SessionInfo>) -> Self {
        infos.sort_by(|a, b| b.last_attached.cmp(&a.last_attached));
        Self::from_ids(infos.into_iter().map(|info| info.id))
    }

    /// Builds the set from ids already in recency order.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SessionId>,
    {
        let mut ordered: Vec<SessionId> = Vec::new();
        for id in ids {
            let id = id.into();
            if !ordered.contains(&id) {
                ordered.push(id);
            }
        }
        Self { ordered }
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.ordered.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionId> {
        self.ordered.iter()
    }

    pub fn as_slice(&self) -> &[SessionId] {
        &self.ordered
    }
}
