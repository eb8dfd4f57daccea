use serde::Serialize;

use crate::{Node, NodeId, State};

/// Serializable view of a node and its subtree, for debuggers and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub state: State,
    pub collapsed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<DecoratorSnapshot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecoratorSnapshot {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub is_guard: bool,
    pub function: String,
}

impl NodeSnapshot {
    pub fn capture(node: &Node) -> Self {
        Self {
            id: node.id(),
            kind: node.kind().type_name(),
            name: node.name(),
            state: node.state(),
            collapsed: node.collapsed(),
            decorators: node
                .decorators()
                .iter()
                .map(|d| DecoratorSnapshot {
                    kind: d.kind().as_str(),
                    is_guard: d.is_guard(),
                    function: d.function().to_string(),
                })
                .collect(),
            children: node.children().iter().map(NodeSnapshot::capture).collect(),
        }
    }

    /// Number of nodes in this snapshot, itself included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeSnapshot::node_count).sum::<usize>()
    }

    /// Depth-first iterator over this snapshot and its descendants.
    pub fn iter(&self) -> impl Iterator<Item = &NodeSnapshot> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}
