use btree::{BehaviourTree, Node, TreeOptions};

use crate::definition::Definition;
use crate::{parse_item, AstNode, BuildError, RootCatalog};

/// Entry point from a declarative definition to an executable tree.
///
/// Building runs three phases: every item is parsed into descriptors, every
/// root is validated, then the main root is instantiated with its branches
/// resolved. The first error aborts the build.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder {
    options: TreeOptions,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options given to every tree this builder produces.
    pub fn with_options(mut self, options: TreeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Parse and validate without instantiating.
    pub fn parse(&self, definition: &Definition) -> Result<RootCatalog, BuildError> {
        let roots = definition
            .items
            .iter()
            .map(parse_item)
            .collect::<Result<Vec<AstNode>, _>>()?;
        let catalog = RootCatalog::from_ast(roots)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn build(&self, definition: &Definition) -> Result<BehaviourTree, BuildError> {
        let catalog = self.parse(definition)?;
        let root = catalog.instantiate_main()?;
        Ok(self.finish(&catalog, root))
    }

    pub fn build_json(&self, text: &str) -> Result<BehaviourTree, BuildError> {
        self.build(&Definition::from_json(text)?)
    }

    /// Build the named root `name` as the tree's root.
    pub fn build_named(&self, definition: &Definition, name: &str) -> Result<BehaviourTree, BuildError> {
        let catalog = self.parse(definition)?;
        let root = catalog.instantiate(name)?;
        Ok(self.finish(&catalog, root))
    }

    fn finish(&self, catalog: &RootCatalog, root: Node) -> BehaviourTree {
        let tree = BehaviourTree::new(root).with_options(self.options);
        tracing::debug!(
            roots = catalog.len(),
            branches = catalog.names().count(),
            root = tree.root().kind().type_name(),
            "built behaviour tree"
        );
        tree
    }
}
