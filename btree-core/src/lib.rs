//! State, blackboard and deterministic tick primitives for the `btree` engine.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod rng;
pub mod state;
pub mod tick;

pub use blackboard::{BbKey, Blackboard, CallData, MemoryBlackboard, Values};
pub use rng::{DeterministicRng, SplitMix64};
pub use state::{ActionStatus, State};
pub use tick::TickContext;
