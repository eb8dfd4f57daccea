use btree_core::{Blackboard, State};

use crate::node::expect_updated;
use crate::{Node, RuntimeError, UpdateContext};

/// Re-runs its child until an iteration limit is reached.
///
/// The limit is `iterations` when set, otherwise `maximum_iterations`, and is
/// unbounded when neither is set. A failing child fails the repeat.
#[derive(Debug)]
pub struct Repeat {
    iterations: Option<u32>,
    maximum_iterations: Option<u32>,
    completed: u32,
    child: Box<Node>,
}

impl Repeat {
    pub fn new(iterations: Option<u32>, maximum_iterations: Option<u32>, child: Node) -> Self {
        Self {
            iterations,
            maximum_iterations,
            completed: 0,
            child: Box::new(child),
        }
    }

    pub fn iterations(&self) -> Option<u32> {
        self.iterations
    }

    pub fn maximum_iterations(&self) -> Option<u32> {
        self.maximum_iterations
    }

    /// Iterations finished in the current run.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn limit(&self) -> Option<u32> {
        match (self.iterations, self.maximum_iterations) {
            (Some(iterations), Some(maximum)) => Some(iterations.min(maximum)),
            (Some(iterations), None) => Some(iterations),
            (None, maximum) => maximum,
        }
    }

    fn limit_reached(&self) -> bool {
        self.limit().is_some_and(|limit| self.completed >= limit)
    }

    pub fn child(&self) -> &Node {
        &self.child
    }

    pub(crate) fn child_mut(&mut self) -> &mut Node {
        &mut self.child
    }

    pub(crate) fn update<B>(&mut self, board: &mut B, cx: &mut UpdateContext<'_>) -> Result<State, RuntimeError>
    where
        B: Blackboard + ?Sized,
    {
        if self.limit_reached() {
            return Ok(State::Succeeded);
        }

        // The previous iteration finished; start the next one from scratch.
        if self.child.state() == State::Succeeded {
            self.child.reset();
        }

        let status = self.child.update(board, cx)?;
        match expect_updated(&self.child, status)? {
            State::Failed => Ok(State::Failed),
            State::Succeeded => {
                self.completed = self.completed.saturating_add(1);
                if self.limit_reached() {
                    Ok(State::Succeeded)
                } else {
                    Ok(State::Running)
                }
            }
            _ => Ok(State::Running),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.completed = 0;
        self.child.reset();
    }
}

/// Swaps its child's success and failure.
#[derive(Debug)]
pub struct Flip {
    child: Box<Node>,
}

impl Flip {
    pub fn new(child: Node) -> Self {
        Self {
            child: Box::new(child),
        }
    }

    pub fn child(&self) -> &Node {
        &self.child
    }

    pub(crate) fn child_mut(&mut self) -> &mut Node {
        &mut self.child
    }

    pub(crate) fn update<B>(&mut self, board: &mut B, cx: &mut UpdateContext<'_>) -> Result<State, RuntimeError>
    where
        B: Blackboard + ?Sized,
    {
        let status = self.child.update(board, cx)?;
        Ok(expect_updated(&self.child, status)?.flip())
    }

    pub(crate) fn reset(&mut self) {
        self.child.reset();
    }
}
