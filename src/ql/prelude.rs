use std::borrow::Borrow;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Name of a state node.
///
/// States are identified by name equality, never by instance. The name is an
/// opaque label produced by the caller (e.g. a serialized feature vector).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(String);

impl StateId {
    pub fn new(name: impl Into<String>) -> Self {
        StateId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateId {
    fn from(name: &str) -> Self {
        StateId(name.to_owned())
    }
}

impl Borrow<str> for StateId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Name of an action edge. Unique within its owning state, not globally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn new(name: impl Into<String>) -> Self {
        ActionId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ActionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(name: &str) -> Self {
        ActionId(name.to_owned())
    }
}

impl Borrow<str> for ActionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Failures surfaced by the engine.
///
/// Unknown states, unknown actions and states without outgoing edges are not
/// errors; those surface as `None` so the caller can fall back to its own
/// exploration policy. Only persistence can fail.
#[derive(Debug, thiserror::Error)]
pub enum QlError {
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("malformed Q-table data: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QlError>;
