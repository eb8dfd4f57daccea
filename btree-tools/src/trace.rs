use std::cell::RefCell;
use std::rc::Rc;

use btree_core::State;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One node state transition, recorded during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub node: u32,
    pub from: State,
    pub to: State,
}

impl TraceEvent {
    pub fn new(tick: u64, node: u32, from: State, to: State) -> Self {
        Self {
            tick,
            node,
            from,
            to,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self.to {
            State::Ready => "bt.node.ready",
            State::Running => "bt.node.running",
            State::Succeeded => "bt.node.succeeded",
            State::Failed => "bt.node.failed",
        }
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    /// Transitions of one node, oldest first.
    pub fn for_node(&self, node: u32) -> impl Iterator<Item = &TraceEvent> + '_ {
        self.events.iter().filter(move |e| e.node == node)
    }

    /// The most recent state a node moved into, if it moved at all.
    pub fn last_state(&self, node: u32) -> Option<State> {
        self.for_node(node).last().map(|e| e.to)
    }
}

impl TraceSink for TraceLog {
    fn emit(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// A [`TraceLog`] that stays readable after a clone has been handed to a tree.
#[derive(Debug, Default, Clone)]
pub struct SharedTraceLog {
    inner: Rc<RefCell<TraceLog>>,
}

impl SharedTraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> TraceLog {
        self.inner.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().events.clear();
    }
}

impl TraceSink for SharedTraceLog {
    fn emit(&mut self, event: TraceEvent) {
        self.inner.borrow_mut().push(event);
    }
}
