use btree_core::{Blackboard, CallData, DeterministicRng, State};

use crate::{NodeId, RuntimeError, UpdateContext};

const WAIT_STREAM: u64 = 0x5741_4954;

/// Calls a named blackboard operation on every update until the operation
/// reports success or failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    function: String,
    data: CallData,
}

impl Action {
    pub fn new(function: impl Into<String>, data: CallData) -> Self {
        Self {
            function: function.into(),
            data,
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn data(&self) -> &CallData {
        &self.data
    }

    pub(crate) fn update<B>(&mut self, board: &mut B) -> Result<State, RuntimeError>
    where
        B: Blackboard + ?Sized,
    {
        if !board.has_operation(&self.function) {
            return Err(RuntimeError::OperationNotFound {
                name: self.function.clone(),
            });
        }
        Ok(board.call_operation(&self.function, &self.data).into())
    }
}

/// Evaluates a named blackboard predicate. Never `Running`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    function: String,
}

impl Condition {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub(crate) fn update<B>(&mut self, board: &mut B) -> Result<State, RuntimeError>
    where
        B: Blackboard + ?Sized,
    {
        if !board.has_condition(&self.function) {
            return Err(RuntimeError::ConditionNotFound {
                name: self.function.clone(),
            });
        }
        Ok(if board.evaluate_condition(&self.function) {
            State::Succeeded
        } else {
            State::Failed
        })
    }
}

/// Succeeds once a duration has elapsed on the tick clock.
///
/// With a `longest_duration` the target is drawn uniformly from
/// `duration..=longest_duration` each time the node is entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wait {
    duration: u64,
    longest_duration: Option<u64>,
    started_at: Option<u64>,
    target: u64,
}

impl Wait {
    pub fn new(duration: u64, longest_duration: Option<u64>) -> Self {
        Self {
            duration,
            longest_duration,
            started_at: None,
            target: duration,
        }
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn longest_duration(&self) -> Option<u64> {
        self.longest_duration
    }

    /// Duration picked on entry; equals `duration` until the node starts.
    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn started_at(&self) -> Option<u64> {
        self.started_at
    }

    pub(crate) fn update(&mut self, id: NodeId, cx: &UpdateContext<'_>) -> State {
        let now = cx.tick.now_ms;
        let started_at = match self.started_at {
            Some(started_at) => started_at,
            None => {
                self.target = match self.longest_duration {
                    Some(longest) if longest > self.duration => {
                        cx.rng(id, WAIT_STREAM).range_inclusive(self.duration, longest)
                    }
                    _ => self.duration,
                };
                self.started_at = Some(now);
                now
            }
        };

        if now.saturating_sub(started_at) >= self.target {
            State::Succeeded
        } else {
            State::Running
        }
    }

    pub(crate) fn reset(&mut self) {
        self.started_at = None;
        self.target = self.duration;
    }
}
