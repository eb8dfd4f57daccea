//! Tooling primitives for the `btree` engine.
//!
//! Kept engine-agnostic: a tree reports each node state transition to a
//! [`TraceSink`], and debuggers, inspectors or the CLI decide what to do
//! with the events.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{NullTraceSink, SharedTraceLog, TraceEvent, TraceLog, TraceSink, VecTraceSink};
