use btree_core::{Blackboard, State};

use crate::node::expect_updated;
use crate::{LottoDraw, Node, NodeId, RuntimeError, UpdateContext};

const LOTTO_STREAM: u64 = 0x4C4F_5454;

// Children that already finished on an earlier tick are not updated again:
// `Node::update` returns a terminal state untouched, so composites can read
// it back the same way as a fresh result.

/// Runs children in order until one fails or all succeed.
#[derive(Debug)]
pub struct Sequence {
    children: Vec<Node>,
}

impl Sequence {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    pub(crate) fn update<B>(&mut self, board: &mut B, cx: &mut UpdateContext<'_>) -> Result<State, RuntimeError>
    where
        B: Blackboard + ?Sized,
    {
        let last = self.children.len().saturating_sub(1);
        for (i, child) in self.children.iter_mut().enumerate() {
            let status = child.update(board, cx)?;
            match expect_updated(child, status)? {
                State::Succeeded if i < last => continue,
                State::Succeeded => return Ok(State::Succeeded),
                State::Failed => return Ok(State::Failed),
                _ => return Ok(State::Running),
            }
        }

        // Only reachable with no children.
        Ok(State::Succeeded)
    }

    pub(crate) fn reset(&mut self) {
        for c in self.children.iter_mut() {
            c.reset();
        }
    }
}

/// Runs children in order until one succeeds or all fail.
#[derive(Debug)]
pub struct Selector {
    children: Vec<Node>,
}

impl Selector {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    pub(crate) fn update<B>(&mut self, board: &mut B, cx: &mut UpdateContext<'_>) -> Result<State, RuntimeError>
    where
        B: Blackboard + ?Sized,
    {
        let last = self.children.len().saturating_sub(1);
        for (i, child) in self.children.iter_mut().enumerate() {
            let status = child.update(board, cx)?;
            match expect_updated(child, status)? {
                State::Failed if i < last => continue,
                State::Failed => return Ok(State::Failed),
                State::Succeeded => return Ok(State::Succeeded),
                _ => return Ok(State::Running),
            }
        }

        // Only reachable with no children.
        Ok(State::Failed)
    }

    pub(crate) fn reset(&mut self) {
        for c in self.children.iter_mut() {
            c.reset();
        }
    }
}

/// Updates every active child on every tick.
///
/// Fails as soon as any child has failed (after the whole pass), succeeds
/// once every child has succeeded, and is `Running` otherwise.
#[derive(Debug)]
pub struct Parallel {
    children: Vec<Node>,
}

impl Parallel {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    pub(crate) fn update<B>(&mut self, board: &mut B, cx: &mut UpdateContext<'_>) -> Result<State, RuntimeError>
    where
        B: Blackboard + ?Sized,
    {
        let mut any_failed = false;
        let mut all_succeeded = true;
        for child in self.children.iter_mut() {
            let status = child.update(board, cx)?;
            match expect_updated(child, status)? {
                State::Failed => {
                    any_failed = true;
                    all_succeeded = false;
                }
                State::Running => all_succeeded = false,
                _ => {}
            }
        }

        Ok(if any_failed {
            State::Failed
        } else if all_succeeded {
            State::Succeeded
        } else {
            State::Running
        })
    }

    pub(crate) fn reset(&mut self) {
        for c in self.children.iter_mut() {
            c.reset();
        }
    }
}

/// Picks one child by weighted draw on entry and mirrors it until reset.
#[derive(Debug)]
pub struct Lotto {
    tickets: Vec<u32>,
    children: Vec<Node>,
    winner: Option<usize>,
}

impl Lotto {
    /// `tickets[i]` weights child `i`; a missing or zero entry counts as one
    /// ticket.
    pub fn new(tickets: Vec<u32>, children: Vec<Node>) -> Self {
        Self {
            tickets,
            children,
            winner: None,
        }
    }

    pub fn tickets(&self) -> &[u32] {
        &self.tickets
    }

    /// Index of the child drawn for the current run, if any.
    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    fn tickets_for(&self, index: usize) -> u32 {
        match self.tickets.get(index) {
            Some(&t) if t > 0 => t,
            _ => 1,
        }
    }

    pub(crate) fn update<B>(
        &mut self,
        id: NodeId,
        board: &mut B,
        cx: &mut UpdateContext<'_>,
    ) -> Result<State, RuntimeError>
    where
        B: Blackboard + ?Sized,
    {
        let winner = match self.winner {
            Some(winner) => winner,
            None => {
                let mut draw = LottoDraw::new();
                for index in 0..self.children.len() {
                    draw.add(index, self.tickets_for(index));
                }
                let winner = draw.draw(&mut cx.rng(id, LOTTO_STREAM))?;
                tracing::trace!(node = id.0, winner, "lotto winner drawn");
                self.winner = Some(winner);
                winner
            }
        };

        let child = &mut self.children[winner];
        let status = child.update(board, cx)?;
        expect_updated(child, status)
    }

    pub(crate) fn reset(&mut self) {
        self.winner = None;
        for c in self.children.iter_mut() {
            c.reset();
        }
    }
}

/// Top-level wrapper with exactly one child; mirrors that child.
#[derive(Debug)]
pub struct Root {
    name: Option<String>,
    child: Box<Node>,
}

impl Root {
    pub fn new(name: Option<String>, child: Node) -> Self {
        Self {
            name,
            child: Box::new(child),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
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
        expect_updated(&self.child, status)
    }

    pub(crate) fn reset(&mut self) {
        self.child.reset();
    }
}
