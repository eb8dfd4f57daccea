//! Intermediate descriptors between a parsed definition and executable nodes.

use btree::{CallData, Decorator, Node};

use crate::{Arity, BranchResolver, BuildError};

/// Kind of a descriptor, with the raw properties read from the definition.
///
/// Numbers stay signed until validation so that negative values can be
/// reported instead of wrapping.
#[derive(Debug, Clone, PartialEq)]
pub enum AstKind {
    Root { name: Option<String> },
    Branch { name: String },
    Sequence,
    Selector,
    Parallel,
    Lotto { tickets: Vec<i64> },
    Repeat { iterations: Option<i64>, maximum_iterations: Option<i64> },
    Flip,
    Wait { duration: i64, longest_duration: Option<i64> },
    Condition { function: String },
    Action { function: String, data: CallData },
}

impl AstKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            AstKind::Root { .. } => "root",
            AstKind::Branch { .. } => "branch",
            AstKind::Sequence => "sequence",
            AstKind::Selector => "selector",
            AstKind::Parallel => "parallel",
            AstKind::Lotto { .. } => "lotto",
            AstKind::Repeat { .. } => "repeat",
            AstKind::Flip => "flip",
            AstKind::Wait { .. } => "wait",
            AstKind::Condition { .. } => "condition",
            AstKind::Action { .. } => "action",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            AstKind::Root { .. } | AstKind::Repeat { .. } | AstKind::Flip => Arity::ExactlyOne,
            AstKind::Sequence | AstKind::Selector | AstKind::Parallel | AstKind::Lotto { .. } => Arity::AtLeastOne,
            AstKind::Branch { .. } | AstKind::Wait { .. } | AstKind::Condition { .. } | AstKind::Action { .. } => {
                Arity::None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub kind: AstKind,
    pub children: Vec<AstNode>,
    pub decorators: Vec<Decorator>,
    pub collapsed: bool,
}

impl AstNode {
    pub fn new(kind: AstKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            decorators: Vec::new(),
            collapsed: false,
        }
    }

    pub fn root(name: Option<String>) -> Self {
        Self::new(AstKind::Root { name })
    }

    pub fn branch(name: impl Into<String>) -> Self {
        Self::new(AstKind::Branch { name: name.into() })
    }

    pub fn sequence() -> Self {
        Self::new(AstKind::Sequence)
    }

    pub fn selector() -> Self {
        Self::new(AstKind::Selector)
    }

    pub fn parallel() -> Self {
        Self::new(AstKind::Parallel)
    }

    pub fn lotto(tickets: Vec<i64>) -> Self {
        Self::new(AstKind::Lotto { tickets })
    }

    pub fn repeat(iterations: Option<i64>, maximum_iterations: Option<i64>) -> Self {
        Self::new(AstKind::Repeat {
            iterations,
            maximum_iterations,
        })
    }

    pub fn flip() -> Self {
        Self::new(AstKind::Flip)
    }

    pub fn wait(duration: i64, longest_duration: Option<i64>) -> Self {
        Self::new(AstKind::Wait {
            duration,
            longest_duration,
        })
    }

    pub fn condition(function: impl Into<String>) -> Self {
        Self::new(AstKind::Condition {
            function: function.into(),
        })
    }

    pub fn action(function: impl Into<String>, data: CallData) -> Self {
        Self::new(AstKind::Action {
            function: function.into(),
            data,
        })
    }

    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = AstNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_decorators(mut self, decorators: impl IntoIterator<Item = Decorator>) -> Self {
        self.decorators.extend(decorators);
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    /// Check this descriptor alone. Top-level items are at depth 1.
    pub fn validate(&self, depth: usize) -> Result<(), BuildError> {
        let node = self.kind.type_name();

        if matches!(self.kind, AstKind::Root { .. }) && depth > 1 {
            return Err(BuildError::RootNotTopLevel { depth });
        }

        let expected = self.kind.arity();
        if !expected.accepts(self.children.len()) {
            return Err(BuildError::Arity {
                node,
                expected,
                found: self.children.len(),
            });
        }

        match &self.kind {
            AstKind::Branch { name } if name.is_empty() => Err(BuildError::EmptyBranchName),
            AstKind::Lotto { tickets } => match tickets.iter().find(|t| **t < 0) {
                Some(t) => Err(out_of_range(node, "tickets", format!("ticket count {t} is negative"))),
                None => Ok(()),
            },
            AstKind::Wait {
                duration,
                longest_duration,
            } => {
                non_negative(node, "duration", Some(*duration))?;
                non_negative(node, "longestDuration", *longest_duration)?;
                match longest_duration {
                    Some(longest) if duration > longest => Err(out_of_range(
                        node,
                        "duration",
                        format!("shortest duration {duration} exceeds the longest duration {longest}"),
                    )),
                    _ => Ok(()),
                }
            }
            AstKind::Repeat {
                iterations,
                maximum_iterations,
            } => {
                non_negative(node, "times", *iterations)?;
                non_negative(node, "maximumIterations", *maximum_iterations)?;
                match (iterations, maximum_iterations) {
                    (Some(iterations), Some(maximum)) if iterations > maximum => Err(out_of_range(
                        node,
                        "times",
                        format!("iteration count {iterations} exceeds the maximum iteration count {maximum}"),
                    )),
                    _ => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    /// Check this descriptor and every descendant.
    pub fn validate_tree(&self, depth: usize) -> Result<(), BuildError> {
        self.validate(depth)?;
        for child in &self.children {
            child.validate_tree(depth + 1)?;
        }
        Ok(())
    }

    /// Build the executable node for this descriptor.
    ///
    /// `visited` holds the branch names entered on the current path; a
    /// branch whose name is already on it is a cycle. The stack is restored
    /// before returning, so sibling paths may reference the same branch.
    pub fn instantiate<'a>(
        &self,
        resolver: &dyn BranchResolver<'a>,
        visited: &mut Vec<String>,
    ) -> Result<Node, BuildError> {
        self.instantiate_with(resolver, visited, &[])
    }

    fn instantiate_with<'a>(
        &self,
        resolver: &dyn BranchResolver<'a>,
        visited: &mut Vec<String>,
        leading: &[Decorator],
    ) -> Result<Node, BuildError> {
        let node = self.kind.type_name();
        let mut children = self
            .children
            .iter()
            .map(|child| child.instantiate(resolver, visited))
            .collect::<Result<Vec<_>, _>>()?;

        let built = match &self.kind {
            AstKind::Root { name } => Node::root(name.clone(), single(node, &mut children)?),
            AstKind::Sequence => Node::sequence(children),
            AstKind::Selector => Node::selector(children),
            AstKind::Parallel => Node::parallel(children),
            AstKind::Lotto { tickets } => {
                let tickets = tickets
                    .iter()
                    .map(|t| to_u32(node, "tickets", *t))
                    .collect::<Result<Vec<_>, _>>()?;
                Node::lotto(tickets, children)
            }
            AstKind::Repeat {
                iterations,
                maximum_iterations,
            } => Node::repeat(
                iterations.map(|i| to_u32(node, "times", i)).transpose()?,
                maximum_iterations
                    .map(|m| to_u32(node, "maximumIterations", m))
                    .transpose()?,
                single(node, &mut children)?,
            ),
            AstKind::Flip => Node::flip(single(node, &mut children)?),
            AstKind::Wait {
                duration,
                longest_duration,
            } => {
                let duration = to_u64(node, "duration", *duration)?;
                match longest_duration {
                    Some(longest) => Node::wait_between(duration, to_u64(node, "longestDuration", *longest)?),
                    None => Node::wait(duration),
                }
            }
            AstKind::Condition { function } => Node::condition(function.clone()),
            AstKind::Action { function, data } => Node::action_with_data(function.clone(), data.clone()),
            AstKind::Branch { name } => return self.instantiate_branch(name, resolver, visited, leading),
        };

        Ok(built
            .with_decorators(leading.iter().chain(&self.decorators).cloned())
            .with_collapsed(self.collapsed))
    }

    /// Substitute the single child of the referenced root. Hooks written on
    /// the branch item run before the substituted node's own hooks.
    fn instantiate_branch<'a>(
        &self,
        name: &str,
        resolver: &dyn BranchResolver<'a>,
        visited: &mut Vec<String>,
        leading: &[Decorator],
    ) -> Result<Node, BuildError> {
        if visited.iter().any(|v| v == name) {
            return Err(BuildError::CircularBranch { name: name.to_string() });
        }

        let target = resolver
            .resolve(name)
            .ok_or_else(|| BuildError::MissingBranch { name: name.to_string() })?;
        let child = match (&target.kind, target.children.as_slice()) {
            (AstKind::Root { .. }, [child]) => child,
            (AstKind::Root { .. }, children) => {
                return Err(BuildError::Arity {
                    node: "root",
                    expected: Arity::ExactlyOne,
                    found: children.len(),
                })
            }
            (other, _) => {
                return Err(BuildError::TopLevelNotRoot {
                    kind: other.type_name(),
                })
            }
        };

        let mut hooks = leading.to_vec();
        hooks.extend(self.decorators.iter().cloned());

        tracing::trace!(branch = name, depth = visited.len(), "resolving branch");
        visited.push(name.to_string());
        let result = child.instantiate_with(resolver, visited, &hooks);
        visited.pop();
        result
    }
}

fn single(node: &'static str, children: &mut Vec<Node>) -> Result<Node, BuildError> {
    let found = children.len();
    match children.pop() {
        Some(child) if found == 1 => Ok(child),
        _ => Err(BuildError::Arity {
            node,
            expected: Arity::ExactlyOne,
            found,
        }),
    }
}

fn out_of_range(node: &'static str, property: &'static str, reason: String) -> BuildError {
    BuildError::OutOfRange { node, property, reason }
}

fn non_negative(node: &'static str, property: &'static str, value: Option<i64>) -> Result<(), BuildError> {
    match value {
        Some(v) if v < 0 => Err(out_of_range(node, property, format!("{v} is negative"))),
        _ => Ok(()),
    }
}

fn to_u32(node: &'static str, property: &'static str, value: i64) -> Result<u32, BuildError> {
    u32::try_from(value).map_err(|_| out_of_range(node, property, format!("{value} does not fit in 32 bits")))
}

fn to_u64(node: &'static str, property: &'static str, value: i64) -> Result<u64, BuildError> {
    u64::try_from(value).map_err(|_| out_of_range(node, property, format!("{value} is negative")))
}
