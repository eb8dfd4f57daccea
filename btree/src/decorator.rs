//! Guards and hooks attached to a node.
//!
//! Guards (`While` / `Until`) gate a node on a blackboard condition. Hooks
//! (`Entry` / `Step` / `Exit`) call a blackboard operation for its side
//! effects only; whatever the operation returns is ignored.

use btree_core::{Blackboard, CallData, State};

use crate::RuntimeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoratorKind {
    /// The node may run while the condition holds.
    While,
    /// The node runs until the condition holds.
    Until,
    Entry,
    Step,
    Exit,
}

impl DecoratorKind {
    pub fn is_guard(self) -> bool {
        matches!(self, DecoratorKind::While | DecoratorKind::Until)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DecoratorKind::While => "while",
            DecoratorKind::Until => "until",
            DecoratorKind::Entry => "entry",
            DecoratorKind::Step => "step",
            DecoratorKind::Exit => "exit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    kind: DecoratorKind,
    function: String,
    data: CallData,
}

impl Decorator {
    pub fn new(kind: DecoratorKind, function: impl Into<String>) -> Self {
        Self {
            kind,
            function: function.into(),
            data: CallData::new(),
        }
    }

    pub fn guard_while(condition: impl Into<String>) -> Self {
        Self::new(DecoratorKind::While, condition)
    }

    pub fn guard_until(condition: impl Into<String>) -> Self {
        Self::new(DecoratorKind::Until, condition)
    }

    pub fn entry(function: impl Into<String>) -> Self {
        Self::new(DecoratorKind::Entry, function)
    }

    pub fn step(function: impl Into<String>) -> Self {
        Self::new(DecoratorKind::Step, function)
    }

    pub fn exit(function: impl Into<String>) -> Self {
        Self::new(DecoratorKind::Exit, function)
    }

    /// Static data passed to the hook operation on every call.
    pub fn with_data(mut self, data: CallData) -> Self {
        self.data = data;
        self
    }

    pub fn kind(&self) -> DecoratorKind {
        self.kind
    }

    pub fn is_guard(&self) -> bool {
        self.kind.is_guard()
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn data(&self) -> &CallData {
        &self.data
    }

    /// The state a guard forces on its node, or `None` when the node may run.
    /// Hooks never force a state.
    pub fn forced_state<B>(&self, board: &mut B) -> Result<Option<State>, RuntimeError>
    where
        B: Blackboard + ?Sized,
    {
        if !self.is_guard() {
            return Ok(None);
        }
        if !board.has_condition(&self.function) {
            return Err(RuntimeError::ConditionNotFound {
                name: self.function.clone(),
            });
        }
        let holds = board.evaluate_condition(&self.function);
        Ok(match self.kind {
            DecoratorKind::While if !holds => Some(State::Failed),
            DecoratorKind::Until if holds => Some(State::Succeeded),
            _ => None,
        })
    }

    pub fn call<B>(&self, board: &mut B) -> Result<(), RuntimeError>
    where
        B: Blackboard + ?Sized,
    {
        if !board.has_operation(&self.function) {
            return Err(RuntimeError::OperationNotFound {
                name: self.function.clone(),
            });
        }
        let _ = board.call_operation(&self.function, &self.data);
        Ok(())
    }
}

/// First guard, in attachment order, that forces a state.
pub(crate) fn check_guards<B>(decorators: &[Decorator], board: &mut B) -> Result<Option<State>, RuntimeError>
where
    B: Blackboard + ?Sized,
{
    for guard in decorators.iter().filter(|d| d.is_guard()) {
        if let Some(forced) = guard.forced_state(board)? {
            return Ok(Some(forced));
        }
    }
    Ok(None)
}

pub(crate) fn fire<B>(decorators: &[Decorator], kind: DecoratorKind, board: &mut B) -> Result<(), RuntimeError>
where
    B: Blackboard + ?Sized,
{
    for hook in decorators.iter().filter(|d| d.kind == kind) {
        hook.call(board)?;
    }
    Ok(())
}
