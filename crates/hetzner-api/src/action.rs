//! Cloud actions: server-tracked asynchronous operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A long-running operation started by a state-changing Cloud request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: u64,
    /// Operation name, e.g. `start_server`
    pub command: String,
    pub status: ActionStatus,
    /// Completion in percent (0-100)
    #[serde(default)]
    pub progress: u8,
    pub started: DateTime<Utc>,
    #[serde(default)]
    pub finished: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resources: Vec<ActionResource>,
    #[serde(default)]
    pub error: Option<ActionError>,
}

impl Action {
    /// Message reported for a failed action
    #[must_use]
    pub fn error_message(&self) -> &str {
        self.error
            .as_ref()
            .map_or("Unknown error", |e| e.message.as_str())
    }
}

/// Action lifecycle state; transitions happen server-side only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Running,
    Success,
    Error,
}

impl ActionStatus {
    /// Whether the action has stopped changing
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, ActionStatus::Running)
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionStatus::Running => write!(f, "running"),
            ActionStatus::Success => write!(f, "success"),
            ActionStatus::Error => write!(f, "error"),
        }
    }
}

/// Resource an action operates on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResource {
    pub id: u64,
    #[serde(rename = "type")]
    pub resource_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionError {
    pub code: String,
    pub message: String,
}
