use std::collections::BTreeMap;

use btree::Node;

use crate::{AstKind, AstNode, BuildError};

/// Looks up the named root a `Branch` refers to.
pub trait BranchResolver<'a> {
    fn resolve(&self, name: &str) -> Option<&'a AstNode>;
}

impl<'a, F> BranchResolver<'a> for F
where
    F: Fn(&str) -> Option<&'a AstNode>,
{
    fn resolve(&self, name: &str) -> Option<&'a AstNode> {
        self(name)
    }
}

/// The top-level roots of a definition: one unnamed main root plus any
/// number of named roots that branches can reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootCatalog {
    main: Option<AstNode>,
    named: BTreeMap<String, AstNode>,
}

impl RootCatalog {
    /// Sort top-level descriptors into the main root and named roots.
    pub fn from_ast(roots: impl IntoIterator<Item = AstNode>) -> Result<Self, BuildError> {
        let mut catalog = Self::default();
        for root in roots {
            let name = match &root.kind {
                AstKind::Root { name } => name.clone(),
                other => {
                    return Err(BuildError::TopLevelNotRoot {
                        kind: other.type_name(),
                    })
                }
            };

            match name {
                None if catalog.main.is_some() => {
                    return Err(BuildError::DuplicateRoot { name: String::new() });
                }
                None => catalog.main = Some(root),
                Some(name) if catalog.named.contains_key(&name) => {
                    return Err(BuildError::DuplicateRoot { name });
                }
                Some(name) => {
                    catalog.named.insert(name, root);
                }
            }
        }
        Ok(catalog)
    }

    pub fn main(&self) -> Option<&AstNode> {
        self.main.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<&AstNode> {
        self.named.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.named.keys().map(String::as_str)
    }

    /// Number of roots, main root included.
    pub fn len(&self) -> usize {
        self.named.len() + usize::from(self.main.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate every root, referenced or not.
    pub fn validate(&self) -> Result<(), BuildError> {
        for root in self.main.iter().chain(self.named.values()) {
            root.validate_tree(1)?;
        }
        Ok(())
    }

    pub fn instantiate_main(&self) -> Result<Node, BuildError> {
        let main = self.main.as_ref().ok_or(BuildError::MissingMainRoot)?;
        main.instantiate(&self, &mut Vec::new())
    }

    /// Build a named root as a tree of its own. The root's name counts as
    /// visited, so a branch back to it is reported as a cycle.
    pub fn instantiate(&self, name: &str) -> Result<Node, BuildError> {
        let root = self.get(name).ok_or_else(|| BuildError::MissingBranch { name: name.to_string() })?;
        let mut visited = vec![name.to_string()];
        root.instantiate(&self, &mut visited)
    }
}

impl<'a> BranchResolver<'a> for &'a RootCatalog {
    fn resolve(&self, name: &str) -> Option<&'a AstNode> {
        self.named.get(name)
    }
}
