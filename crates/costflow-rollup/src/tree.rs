//! Hierarchy tree rollup (sunburst input)

use costflow_record::{Level, Record};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Separator between path segments in a node id
pub const PATH_SEPARATOR: char = '/';

/// One node of the cost hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Path of labels from the first level down to this node
    pub id: String,
    /// Id of the parent node, `None` at the top level
    pub parent: Option<String>,
    /// Label at this node's level
    pub label: String,
    /// Level of this node
    pub level: Level,
    /// Summed cost of all records below this node
    pub value: f64,
}

/// Roll records up along `levels`, parent nodes before children
///
/// Nodes appear in first-seen order. Unlike the flow graph, identity is the
/// full path, so the same label under two parents yields two nodes.
#[must_use]
pub fn hierarchy_tree(records: &[&Record], levels: &[Level]) -> Vec<TreeNode> {
    let mut nodes: IndexMap<String, TreeNode> = IndexMap::new();

    for record in records {
        let mut parent: Option<String> = None;
        let mut id = String::new();
        for &level in levels {
            let label = record.level(level);
            if !id.is_empty() {
                id.push(PATH_SEPARATOR);
            }
            id.push_str(label);

            let node = nodes.entry(id.clone()).or_insert_with(|| TreeNode {
                id: id.clone(),
                parent: parent.clone(),
                label: label.to_string(),
                level,
                value: 0.0,
            });
            node.value += record.cost();
            parent = Some(id.clone());
        }
    }

    nodes.into_values().collect()
}
