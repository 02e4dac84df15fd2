//! Shared payload types exchanged between agents and their drivers.
//!
//! These are the wire shapes carried on the event bus and accepted from the
//! command line. They hold no behaviour beyond (de)serialization.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open key/value mapping carried alongside a goal.
pub type Inventory = Map<String, Value>;

/// Identifier of a goal.
///
/// Controllers send numeric ids; hand-written payloads often use strings, so
/// both are accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GoalId {
    Number(i64),
    Text(String),
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalId::Number(id) => write!(f, "{id}"),
            GoalId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for GoalId {
    fn from(id: i64) -> Self {
        GoalId::Number(id)
    }
}

impl From<&str> for GoalId {
    fn from(id: &str) -> Self {
        GoalId::Text(id.to_string())
    }
}

/// Payload of the `"goal"` topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalPayload {
    #[serde(default)]
    pub goal_id: Option<GoalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Inventory>,
}

impl GoalPayload {
    pub fn new(goal_id: impl Into<GoalId>) -> Self {
        Self {
            goal_id: Some(goal_id.into()),
            inventory: None,
        }
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = Some(inventory);
        self
    }
}

/// Payload of the `"goal_done"` topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalDone {
    pub agent: String,
}
