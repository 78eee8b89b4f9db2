//! Mapping between [`Block`] and the generic property tree used by UI code.
//!
//! The generic tree keeps a block's parameters in a single data node with
//! id 1; children are numbered from 2 in order, and child exemplars continue
//! after the last child. No editing rules live here.

use serde::{Deserialize, Serialize};

use crate::model::*;

/// One parameter as shown in a property sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericEntry {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub default_value: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cpp_type: String,
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub required: bool,
    /// Written uncommented when true.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub allowed_values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericDataNode {
    pub id: u32,
    pub name: String,
    pub entries: Vec<GenericEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericTreeNode {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub block_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub active: bool,
    pub data: GenericDataNode,
    #[serde(default)]
    pub children: Vec<GenericTreeNode>,
    #[serde(default)]
    pub child_exemplars: Vec<GenericTreeNode>,
    /// Names of the alternative shapes, for adaptive blocks.
    #[serde(default)]
    pub variants: Vec<String>,
}

/// Id of the parameter data node; children are numbered after it.
const DATA_NODE_ID: u32 = 1;

pub fn to_generic_tree(block: &Block) -> GenericTreeNode {
    to_node(block, 0)
}

fn to_node(block: &Block, id: u32) -> GenericTreeNode {
    let first_exemplar_id = DATA_NODE_ID + 1 + block.children.len() as u32;
    GenericTreeNode {
        id,
        name: block.name.clone(),
        block_type: block.block_type.clone(),
        description: block.description.clone(),
        comment: block.comment.clone(),
        active: block.active,
        data: GenericDataNode {
            id: DATA_NODE_ID,
            name: format!("{} Parameters", block.name),
            entries: block.parameters.iter().map(to_entry).collect(),
        },
        children: block
            .children
            .iter()
            .enumerate()
            .map(|(i, c)| to_node(c, DATA_NODE_ID + 1 + i as u32))
            .collect(),
        child_exemplars: block
            .exemplars
            .iter()
            .enumerate()
            .map(|(i, e)| to_node(e, first_exemplar_id + i as u32))
            .collect(),
        variants: block
            .adaptive
            .as_ref()
            .map(|a| a.names().map(str::to_string).collect())
            .unwrap_or_default(),
    }
}

fn to_entry(param: &Parameter) -> GenericEntry {
    GenericEntry {
        name: param.name.clone(),
        value: param.value.clone(),
        default_value: param.default_value.clone(),
        description: param.description.clone(),
        cpp_type: param.cpp_type.clone(),
        group_name: param.group_name.clone(),
        required: param.required,
        enabled: param.active,
        allowed_values: param.options.clone(),
    }
}

/// Rebuild a block from a generic tree node.
///
/// Variants are only known by name on the generic side, so the result is
/// never adaptive; callers that need the shapes take them from the catalog.
pub fn from_generic_tree(node: &GenericTreeNode) -> Block {
    Block {
        name: node.name.clone(),
        block_type: node.block_type.clone(),
        description: node.description.clone(),
        comment: node.comment.clone(),
        active: node.active,
        parameters: node.data.entries.iter().map(from_entry).collect(),
        children: node.children.iter().map(from_generic_tree).collect(),
        exemplars: node.child_exemplars.iter().map(from_generic_tree).collect(),
        adaptive: None,
    }
}

fn from_entry(entry: &GenericEntry) -> Parameter {
    Parameter {
        name: entry.name.clone(),
        cpp_type: entry.cpp_type.clone(),
        default_value: entry.default_value.clone(),
        value: entry.value.clone(),
        description: entry.description.clone(),
        group_name: entry.group_name.clone(),
        required: entry.required,
        active: entry.enabled,
        options: entry.allowed_values.clone(),
    }
}
