use thiserror::Error;

use crate::{NodeId, State};

/// Errors that abort the current tick.
///
/// The tree is left exactly as it was when the error surfaced; the host
/// decides whether to halt or [`reset`](crate::BehaviourTree::reset) it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("operation '{name}' is not defined on the blackboard")]
    OperationNotFound { name: String },

    #[error("condition '{name}' is not defined on the blackboard")]
    ConditionNotFound { name: String },

    #[error("child node {child} was not in an expected state ({state})")]
    UnexpectedChildState { child: NodeId, state: State },

    #[error(transparent)]
    Lotto(#[from] LottoError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LottoError {
    #[error("cannot draw a lotto winner when there are no participants")]
    NoParticipants,

    #[error("cannot draw a lotto winner when no participant holds a ticket")]
    NoTickets,
}
