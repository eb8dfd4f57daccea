use core::fmt;

use thiserror::Error;

/// How many children a node kind accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    ExactlyOne,
    AtLeastOne,
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::None => count == 0,
            Arity::ExactlyOne => count == 1,
            Arity::AtLeastOne => count >= 1,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Arity::None => "no children",
            Arity::ExactlyOne => "a single child",
            Arity::AtLeastOne => "at least a single child",
        })
    }
}

/// Errors that abort tree construction. No partial tree is ever produced.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid tree definition: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),

    #[error("unknown hook type '{0}'")]
    UnknownHookType(String),

    #[error("invalid '{property}' on {node} node: {reason}")]
    InvalidProperty {
        node: &'static str,
        property: &'static str,
        reason: String,
    },

    #[error("top-level item must be a root node, found {kind}")]
    TopLevelNotRoot { kind: &'static str },

    #[error("a root node cannot be the child of another node (depth {depth})")]
    RootNotTopLevel { depth: usize },

    #[error("a {node} node must have {expected}, found {found}")]
    Arity {
        node: &'static str,
        expected: Arity,
        found: usize,
    },

    #[error("'{property}' on {node} node is out of range: {reason}")]
    OutOfRange {
        node: &'static str,
        property: &'static str,
        reason: String,
    },

    #[error("branch references root node '{name}' which has not been defined")]
    MissingBranch { name: String },

    #[error("circular dependency found in branch node references for branch '{name}'")]
    CircularBranch { name: String },

    #[error("definition has no unnamed main root")]
    MissingMainRoot,

    #[error("{} is defined more than once", describe_root(.name))]
    DuplicateRoot { name: String },

    #[error("a branch node must name the root it references")]
    EmptyBranchName,
}

fn describe_root(name: &str) -> String {
    if name.is_empty() {
        "the main root".to_string()
    } else {
        format!("root '{name}'")
    }
}
