//! Declarative construction of `btree` trees.
//!
//! A [`Definition`] (usually JSON) is parsed into [`AstNode`] descriptors,
//! validated, and instantiated into executable nodes. Named roots can be
//! referenced from anywhere with `$$.Branch` items; references are expanded
//! at instantiation and cycles are rejected.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod ast;
pub mod builder;
pub mod catalog;
pub mod definition;
pub mod error;
pub mod parse;

pub use ast::{AstKind, AstNode};
pub use builder::TreeBuilder;
pub use catalog::{BranchResolver, RootCatalog};
pub use definition::{Children, Definition, DefinitionItem, FunctionRef, HookDefinition};
pub use error::{Arity, BuildError};
pub use parse::parse_item;
