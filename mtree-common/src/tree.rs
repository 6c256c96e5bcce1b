//! Lineage tree construction
//!
//! Projects the model/relationship graph into a nested tree for hierarchical
//! rendering. Roots are models that never appear as a relationship child; a
//! synthetic super-root collects them.
//!
//! # Traversal
//! Subtrees are built with an explicit stack rather than recursion. The ids on
//! the current root-to-node path are tracked, and an edge back onto that path
//! aborts the build with [`TreeError::Cycle`]. A model with several parents
//! (e.g. a merge) is not a cycle and is placed under each parent.
//!
//! # Dropped nodes
//! Ids are always resolved through the model collection. An edge whose child
//! has no model record is skipped, and a model whose only parents have no
//! model record is neither a root nor reachable, so it is left out.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

use crate::ids::ModelId;
use crate::records::{ModelRecord, RelationType, Relationship};

/// Id of the synthetic super-root
pub const ROOT_ID: &str = "__root__";

/// Display name of the synthetic super-root
pub const ROOT_NAME: &str = "AI Models";

/// Tree build faults
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Edge `from -> to` leads back onto the path currently being built
    #[error("Cycle detected while building tree: {from} -> {to}")]
    Cycle { from: ModelId, to: ModelId },
}

/// One node of the lineage tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: ModelId,

    /// shortName, then name, then id
    pub name: String,

    /// Full source record (absent only on the super-root)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ModelRecord>,

    /// Relation type of the edge from the parent node
    #[serde(rename = "_relType", default, skip_serializing_if = "Option::is_none")]
    pub rel_type: Option<RelationType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn from_model(model: &ModelRecord, rel_type: Option<RelationType>) -> Self {
        Self {
            id: model.id.clone(),
            name: model.display_name().to_string(),
            data: Some(model.clone()),
            rel_type,
            children: Vec::new(),
        }
    }

    fn super_root(children: Vec<TreeNode>) -> Self {
        Self {
            id: ModelId::from(ROOT_ID),
            name: ROOT_NAME.to_string(),
            data: None,
            rel_type: None,
            children,
        }
    }

    /// Total nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }

    /// First node with `id` in pre-order
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            if node.id.as_str() == id {
                return Some(node);
            }
            pending.extend(node.children.iter().rev());
        }
        None
    }
}

impl Drop for TreeNode {
    // Unlinks descendants onto a heap stack so a deep chain drops without recursion.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Precomputed indexes over the input collections
struct Lookup<'a> {
    models: HashMap<&'a ModelId, &'a ModelRecord>,
    children: HashMap<&'a ModelId, Vec<(&'a ModelId, RelationType)>>,
    has_parent: HashSet<&'a ModelId>,
}

impl<'a> Lookup<'a> {
    fn new(models: &'a [ModelRecord], relationships: &'a [Relationship]) -> Self {
        let models_by_id = models.iter().map(|m| (&m.id, m)).collect();
        let mut children: HashMap<&ModelId, Vec<(&ModelId, RelationType)>> = HashMap::new();
        let mut has_parent = HashSet::new();

        for rel in relationships {
            children
                .entry(&rel.parent)
                .or_default()
                .push((&rel.child, rel.relation_type));
            has_parent.insert(&rel.child);
        }

        Self {
            models: models_by_id,
            children,
            has_parent,
        }
    }

    fn edges_of(&self, id: &ModelId) -> &[(&'a ModelId, RelationType)] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Node under construction plus the position in its outgoing edge list
struct Frame<'l, 'a> {
    node: TreeNode,
    edges: &'l [(&'a ModelId, RelationType)],
    next_edge: usize,
}

/// Build the lineage tree.
///
/// Returns the super-root whose children are the root models, in input order.
///
/// # Errors
/// [`TreeError::Cycle`] when a cycle is reachable from a root.
pub fn build_tree(
    models: &[ModelRecord],
    relationships: &[Relationship],
) -> Result<TreeNode, TreeError> {
    let lookup = Lookup::new(models, relationships);

    let mut roots = Vec::new();
    for model in models.iter().filter(|m| !lookup.has_parent.contains(&m.id)) {
        if let Some(node) = build_subtree(&model.id, &lookup)? {
            roots.push(node);
        }
    }

    let tree = TreeNode::super_root(roots);
    debug!(
        roots = tree.children.len(),
        nodes = tree.node_count() - 1,
        "Built lineage tree"
    );
    Ok(tree)
}

/// Build the subtree rooted at `root_id`; `None` when it has no model record
fn build_subtree(root_id: &ModelId, lookup: &Lookup<'_>) -> Result<Option<TreeNode>, TreeError> {
    let Some(root) = lookup.models.get(root_id) else {
        return Ok(None);
    };

    let mut on_path: HashSet<&ModelId> = HashSet::new();
    on_path.insert(&root.id);
    let mut stack = vec![Frame {
        node: TreeNode::from_model(root, None),
        edges: lookup.edges_of(&root.id),
        next_edge: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        let edges = frame.edges;
        if let Some(&(child_id, rel_type)) = edges.get(frame.next_edge) {
            frame.next_edge += 1;

            let Some(child) = lookup.models.get(child_id) else {
                continue;
            };
            if on_path.contains(child_id) {
                return Err(TreeError::Cycle {
                    from: frame.node.id.clone(),
                    to: child_id.clone(),
                });
            }

            on_path.insert(child_id);
            stack.push(Frame {
                node: TreeNode::from_model(child, Some(rel_type)),
                edges: lookup.edges_of(child_id),
                next_edge: 0,
            });
            continue;
        }

        let Some(finished) = stack.pop() else {
            break;
        };
        on_path.remove(&finished.node.id);
        match stack.last_mut() {
            Some(parent) => parent.node.children.push(finished.node),
            None => return Ok(Some(finished.node)),
        }
    }

    Ok(None)
}
