use btree_core::{Blackboard, State, TickContext};
use btree_tools::{NullTraceSink, TraceSink};
use serde::{Deserialize, Serialize};

use crate::{Node, NodeSnapshot, RuntimeError, UpdateContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeOptions {
    /// Seed for lotto draws and randomized waits.
    ///
    /// Draws are derived from `(seed, tick, node id)` only, so two trees of
    /// the same shape with the same seed make identical choices on the same
    /// tick. Give each agent its own seed when their choices should differ.
    pub seed: u64,

    /// Reset a tree that finished on the previous tick before ticking it
    /// again. When off, a finished tree keeps its terminal state until
    /// [`BehaviourTree::reset`] is called.
    pub restart_on_completion: bool,
}

/// An executable tree: the root node plus tick bookkeeping.
pub struct BehaviourTree {
    root: Node,
    options: TreeOptions,
    ticks: u64,
    trace: Box<dyn TraceSink>,
}

impl BehaviourTree {
    pub fn new(mut root: Node) -> Self {
        let mut next = 0;
        root.assign_ids(&mut next);
        Self {
            root,
            options: TreeOptions::default(),
            ticks: 0,
            trace: Box::new(NullTraceSink),
        }
    }

    pub fn with_options(mut self, options: TreeOptions) -> Self {
        self.options = options;
        self
    }

    /// Receive every node state transition made during `tick`.
    pub fn with_trace_sink(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.trace = sink;
        self
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn state(&self) -> State {
        self.root.state()
    }

    pub fn is_running(&self) -> bool {
        self.root.state() == State::Running
    }

    /// Number of ticks performed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance the tree one step. `now_ms` is the caller's clock.
    pub fn tick<B>(&mut self, board: &mut B, now_ms: u64) -> Result<State, RuntimeError>
    where
        B: Blackboard + ?Sized,
    {
        if self.options.restart_on_completion && self.root.state().is_terminal() {
            self.root.reset();
        }

        let ctx = TickContext::new(self.ticks, now_ms).with_seed(self.options.seed);
        self.ticks += 1;

        let mut cx = UpdateContext::new(ctx, self.trace.as_mut());
        match self.root.update(board, &mut cx) {
            Ok(state) => Ok(state),
            Err(err) => {
                tracing::warn!(tick = ctx.tick, error = %err, "behaviour tree tick aborted");
                Err(err)
            }
        }
    }

    /// Return every node to `Ready`.
    pub fn reset(&mut self) {
        self.root.reset();
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot::capture(&self.root)
    }
}

impl core::fmt::Debug for BehaviourTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BehaviourTree")
            .field("root", &self.root)
            .field("options", &self.options)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}
