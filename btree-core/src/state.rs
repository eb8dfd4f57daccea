use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lifecycle state of a node.
///
/// Every node starts `Ready`. `Succeeded` and `Failed` are terminal until the
/// node is reset by its owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum State {
    #[default]
    Ready,
    Running,
    Succeeded,
    Failed,
}

impl State {
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Succeeded | State::Failed)
    }

    /// Swap `Succeeded` and `Failed`; other states pass through.
    pub fn flip(self) -> Self {
        match self {
            State::Succeeded => State::Failed,
            State::Failed => State::Succeeded,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            State::Ready => "READY",
            State::Running => "RUNNING",
            State::Succeeded => "SUCCEEDED",
            State::Failed => "FAILED",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a blackboard operation reports back to the action that called it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ActionStatus {
    Running,
    Success,
    Failure,
}

impl From<ActionStatus> for State {
    fn from(value: ActionStatus) -> Self {
        match value {
            ActionStatus::Running => State::Running,
            ActionStatus::Success => State::Succeeded,
            ActionStatus::Failure => State::Failed,
        }
    }
}

impl From<bool> for ActionStatus {
    fn from(value: bool) -> Self {
        if value {
            ActionStatus::Success
        } else {
            ActionStatus::Failure
        }
    }
}
