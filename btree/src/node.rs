use core::fmt;

use btree_core::{Blackboard, CallData, SplitMix64, State, TickContext};
use btree_tools::{TraceEvent, TraceSink};
use serde::Serialize;

use crate::decorator::{self, Decorator, DecoratorKind};
use crate::{Action, Condition, Flip, Lotto, Parallel, Repeat, Root, RuntimeError, Selector, Sequence, Wait};

/// Depth-first index of a node inside its tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything a node needs during one update besides the blackboard.
pub struct UpdateContext<'a> {
    pub tick: TickContext,
    trace: &'a mut dyn TraceSink,
}

impl<'a> UpdateContext<'a> {
    pub fn new(tick: TickContext, trace: &'a mut dyn TraceSink) -> Self {
        Self { tick, trace }
    }

    /// Random stream owned by one node for the current tick.
    pub fn rng(&self, node: NodeId, stream: u64) -> SplitMix64 {
        self.tick.rng_for_node(u64::from(node.0), stream)
    }

    fn record(&mut self, node: NodeId, from: State, to: State) {
        self.trace.emit(TraceEvent::new(self.tick.tick, node.0, from, to));
    }
}

/// The closed set of node kinds.
#[derive(Debug)]
pub enum NodeKind {
    Action(Action),
    Condition(Condition),
    Wait(Wait),
    Sequence(Sequence),
    Selector(Selector),
    Parallel(Parallel),
    Lotto(Lotto),
    Repeat(Repeat),
    Flip(Flip),
    Root(Root),
}

impl NodeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Action(_) => "action",
            NodeKind::Condition(_) => "condition",
            NodeKind::Wait(_) => "wait",
            NodeKind::Sequence(_) => "sequence",
            NodeKind::Selector(_) => "selector",
            NodeKind::Parallel(_) => "parallel",
            NodeKind::Lotto(_) => "lotto",
            NodeKind::Repeat(_) => "repeat",
            NodeKind::Flip(_) => "flip",
            NodeKind::Root(_) => "root",
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            NodeKind::Action(_) | NodeKind::Condition(_) | NodeKind::Wait(_) => &[],
            NodeKind::Sequence(n) => n.children(),
            NodeKind::Selector(n) => n.children(),
            NodeKind::Parallel(n) => n.children(),
            NodeKind::Lotto(n) => n.children(),
            NodeKind::Repeat(n) => core::slice::from_ref(n.child()),
            NodeKind::Flip(n) => core::slice::from_ref(n.child()),
            NodeKind::Root(n) => core::slice::from_ref(n.child()),
        }
    }

    fn children_mut(&mut self) -> &mut [Node] {
        match self {
            NodeKind::Action(_) | NodeKind::Condition(_) | NodeKind::Wait(_) => &mut [],
            NodeKind::Sequence(n) => n.children_mut(),
            NodeKind::Selector(n) => n.children_mut(),
            NodeKind::Parallel(n) => n.children_mut(),
            NodeKind::Lotto(n) => n.children_mut(),
            NodeKind::Repeat(n) => core::slice::from_mut(n.child_mut()),
            NodeKind::Flip(n) => core::slice::from_mut(n.child_mut()),
            NodeKind::Root(n) => core::slice::from_mut(n.child_mut()),
        }
    }

    fn update<B>(&mut self, id: NodeId, board: &mut B, cx: &mut UpdateContext<'_>) -> Result<State, RuntimeError>
    where
        B: Blackboard + ?Sized,
    {
        match self {
            NodeKind::Action(n) => n.update(board),
            NodeKind::Condition(n) => n.update(board),
            NodeKind::Wait(n) => Ok(n.update(id, cx)),
            NodeKind::Sequence(n) => n.update(board, cx),
            NodeKind::Selector(n) => n.update(board, cx),
            NodeKind::Parallel(n) => n.update(board, cx),
            NodeKind::Lotto(n) => n.update(id, board, cx),
            NodeKind::Repeat(n) => n.update(board, cx),
            NodeKind::Flip(n) => n.update(board, cx),
            NodeKind::Root(n) => n.update(board, cx),
        }
    }

    fn reset(&mut self) {
        match self {
            NodeKind::Action(_) | NodeKind::Condition(_) => {}
            NodeKind::Wait(n) => n.reset(),
            NodeKind::Sequence(n) => n.reset(),
            NodeKind::Selector(n) => n.reset(),
            NodeKind::Parallel(n) => n.reset(),
            NodeKind::Lotto(n) => n.reset(),
            NodeKind::Repeat(n) => n.reset(),
            NodeKind::Flip(n) => n.reset(),
            NodeKind::Root(n) => n.reset(),
        }
    }
}

/// An executable tree node: kind-specific logic plus lifecycle state and
/// decorators.
///
/// The state is only ever changed by [`update`](Node::update) and
/// [`reset`](Node::reset).
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    state: State,
    /// Entry hooks have fired for the current activation.
    entered: bool,
    decorators: Vec<Decorator>,
    collapsed: bool,
    kind: NodeKind,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::default(),
            state: State::Ready,
            entered: false,
            decorators: Vec::new(),
            collapsed: false,
            kind,
        }
    }

    pub fn action(function: impl Into<String>) -> Self {
        Self::new(NodeKind::Action(Action::new(function, CallData::new())))
    }

    pub fn action_with_data(function: impl Into<String>, data: CallData) -> Self {
        Self::new(NodeKind::Action(Action::new(function, data)))
    }

    pub fn condition(function: impl Into<String>) -> Self {
        Self::new(NodeKind::Condition(Condition::new(function)))
    }

    pub fn wait(duration_ms: u64) -> Self {
        Self::new(NodeKind::Wait(Wait::new(duration_ms, None)))
    }

    /// A wait whose duration is drawn from `duration_ms..=longest_ms` each
    /// time the node is entered.
    pub fn wait_between(duration_ms: u64, longest_ms: u64) -> Self {
        Self::new(NodeKind::Wait(Wait::new(duration_ms, Some(longest_ms))))
    }

    pub fn sequence(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Sequence(Sequence::new(children)))
    }

    pub fn selector(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Selector(Selector::new(children)))
    }

    pub fn parallel(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Parallel(Parallel::new(children)))
    }

    pub fn lotto(tickets: Vec<u32>, children: Vec<Node>) -> Self {
        Self::new(NodeKind::Lotto(Lotto::new(tickets, children)))
    }

    pub fn repeat(iterations: Option<u32>, maximum_iterations: Option<u32>, child: Node) -> Self {
        Self::new(NodeKind::Repeat(Repeat::new(iterations, maximum_iterations, child)))
    }

    pub fn flip(child: Node) -> Self {
        Self::new(NodeKind::Flip(Flip::new(child)))
    }

    pub fn root(name: Option<String>, child: Node) -> Self {
        Self::new(NodeKind::Root(Root::new(name, child)))
    }

    pub fn with_decorator(mut self, decorator: Decorator) -> Self {
        self.decorators.push(decorator);
        self
    }

    pub fn with_decorators(mut self, decorators: impl IntoIterator<Item = Decorator>) -> Self {
        self.decorators.extend(decorators);
        self
    }

    /// Presentation-only flag carried through for editors; never affects
    /// execution.
    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn children(&self) -> &[Node] {
        self.kind.children()
    }

    /// Depth-first lookup by id.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    /// Human-readable label, as shown in debuggers.
    pub fn name(&self) -> String {
        match &self.kind {
            NodeKind::Action(n) => n.function().to_string(),
            NodeKind::Condition(n) => n.function().to_string(),
            NodeKind::Wait(n) => match n.longest_duration() {
                Some(longest) => format!("WAIT {}ms-{}ms", n.duration(), longest),
                None => format!("WAIT {}ms", n.duration()),
            },
            NodeKind::Sequence(_) => "SEQUENCE".to_string(),
            NodeKind::Selector(_) => "SELECTOR".to_string(),
            NodeKind::Parallel(_) => "PARALLEL".to_string(),
            NodeKind::Lotto(n) if n.tickets().is_empty() => "LOTTO".to_string(),
            NodeKind::Lotto(n) => {
                let tickets: Vec<String> = n.tickets().iter().map(u32::to_string).collect();
                format!("LOTTO [{}]", tickets.join(","))
            }
            NodeKind::Repeat(n) => match n.iterations() {
                Some(iterations) => format!("REPEAT {iterations}x"),
                None => "REPEAT".to_string(),
            },
            NodeKind::Flip(_) => "FLIP".to_string(),
            NodeKind::Root(n) => match n.name() {
                Some(name) => format!("ROOT {name}"),
                None => "ROOT".to_string(),
            },
        }
    }

    /// Renumber this subtree depth-first starting at `next`.
    pub(crate) fn assign_ids(&mut self, next: &mut u32) {
        self.id = NodeId(*next);
        *next += 1;
        for child in self.kind.children_mut() {
            child.assign_ids(next);
        }
    }

    /// Advance this node by one step.
    ///
    /// Terminal nodes are left untouched, so updating a finished subtree
    /// never re-invokes its children. Otherwise guards run first, then
    /// `Entry` (once per activation) and `Step` hooks, then the
    /// kind-specific logic, then `Exit` hooks if the result is terminal.
    ///
    /// An error part way through keeps whatever already happened: `Entry`
    /// does not fire again on the next update, and a terminal result is
    /// committed before `Exit` hooks run.
    pub fn update<B>(&mut self, board: &mut B, cx: &mut UpdateContext<'_>) -> Result<State, RuntimeError>
    where
        B: Blackboard + ?Sized,
    {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        if let Some(forced) = decorator::check_guards(&self.decorators, board)? {
            let was_entered = self.entered;
            self.transition(forced, cx);
            if was_entered {
                decorator::fire(&self.decorators, DecoratorKind::Exit, board)?;
            }
            return Ok(forced);
        }

        if !self.entered {
            decorator::fire(&self.decorators, DecoratorKind::Entry, board)?;
            self.entered = true;
        }
        decorator::fire(&self.decorators, DecoratorKind::Step, board)?;

        let next = self.kind.update(self.id, board, cx)?;
        self.transition(next, cx);

        if next.is_terminal() {
            decorator::fire(&self.decorators, DecoratorKind::Exit, board)?;
        }
        Ok(next)
    }

    /// Return this subtree to `Ready`, discarding any in-progress state.
    pub fn reset(&mut self) {
        self.state = State::Ready;
        self.entered = false;
        self.kind.reset();
    }

    fn transition(&mut self, next: State, cx: &mut UpdateContext<'_>) {
        if next == self.state {
            return;
        }
        tracing::trace!(
            node = self.id.0,
            kind = self.kind.type_name(),
            from = %self.state,
            to = %next,
            "node transition"
        );
        cx.record(self.id, self.state, next);
        self.state = next;
    }
}

/// Shared check for composites: a child that is still `Ready` after being
/// updated broke the update contract.
pub(crate) fn expect_updated(child: &Node, state: State) -> Result<State, RuntimeError> {
    if state == State::Ready {
        return Err(RuntimeError::UnexpectedChildState {
            child: child.id(),
            state,
        });
    }
    Ok(state)
}
