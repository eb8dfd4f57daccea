//! Behaviour tree runtime built on `btree-core`.
//!
//! A tree is an owned hierarchy of [`Node`]s. Each call to
//! [`BehaviourTree::tick`] advances every active node by one step against a
//! [`Blackboard`](btree_core::Blackboard) and never blocks. Nodes keep all of
//! their progress (running child, lotto winner, wait start time, repeat
//! counter) in their own fields, so independent trees never share state.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod composite;
pub mod decorator;
pub mod error;
pub mod leaf;
pub mod lotto;
pub mod modifier;
pub mod node;
pub mod snapshot;
pub mod tree;

pub use btree_core::{ActionStatus, Blackboard, CallData, State, TickContext};
pub use composite::{Lotto, Parallel, Root, Selector, Sequence};
pub use decorator::{Decorator, DecoratorKind};
pub use error::{LottoError, RuntimeError};
pub use leaf::{Action, Condition, Wait};
pub use lotto::LottoDraw;
pub use modifier::{Flip, Repeat};
pub use node::{Node, NodeId, NodeKind, UpdateContext};
pub use snapshot::{DecoratorSnapshot, NodeSnapshot};
pub use tree::{BehaviourTree, TreeOptions};
