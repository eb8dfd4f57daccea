//! Serde model of the declarative tree format.
//!
//! A definition is an ordered list of top-level items, each tagged with
//! `"$type"`. Items nest through `children`, which may hold a single item or
//! an array. Keys not modelled here (`"$data.duration"`, action call data,
//! editor metadata) are kept in [`DefinitionItem::properties`].

use btree::CallData;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::BuildError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Definition {
    pub items: Vec<DefinitionItem>,
}

impl Definition {
    pub fn new(items: Vec<DefinitionItem>) -> Self {
        Self { items }
    }

    pub fn from_json(text: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_value(value: Value) -> Result<Self, BuildError> {
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionItem {
    #[serde(rename = "$type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Children>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<HookDefinition>,

    /// Editor presentation flag.
    #[serde(default)]
    pub collapsed: bool,

    /// Predicate of a `$$.Condition` item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<FunctionRef>,

    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl DefinitionItem {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            children: None,
            hooks: Vec::new(),
            collapsed: false,
            condition: None,
            properties: Map::new(),
        }
    }

    pub fn children(&self) -> &[DefinitionItem] {
        match &self.children {
            Some(children) => children.as_slice(),
            None => &[],
        }
    }
}

/// `children` as written: a lone item or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Children {
    Many(Vec<DefinitionItem>),
    One(Box<DefinitionItem>),
}

impl Children {
    pub fn as_slice(&self) -> &[DefinitionItem] {
        match self {
            Children::Many(items) => items,
            Children::One(item) => core::slice::from_ref(item.as_ref()),
        }
    }
}

/// An entry of an item's `hooks` list. Guards carry a `condition`, the
/// Entry/Step/Exit hooks an `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookDefinition {
    #[serde(rename = "$type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<FunctionRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<FunctionRef>,
}

/// A named blackboard function plus any static data written next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRef {
    #[serde(rename = "$type")]
    pub name: String,

    #[serde(flatten)]
    pub data: CallData,
}
