//! Collapse state and the visibility rule.
//!
//! Collapsing a node hides its descendant subtree from layout and rendering
//! while leaving every node in the model. Visibility is recomputed from the
//! parent chain on demand and never cached across structural changes.

use crate::id::NodeId;
use crate::model::MindMap;

/// A node is visible iff no ancestor on its path to a root is collapsed.
/// The collapsed node itself stays visible.
pub fn is_visible(map: &MindMap, id: NodeId) -> bool {
    let Some(node) = map.node(id) else {
        return false;
    };
    let mut cur = node.parent;
    while let Some(pid) = cur {
        let Some(parent) = map.node(pid) else {
            return false;
        };
        if parent.collapsed {
            return false;
        }
        cur = parent.parent;
    }
    true
}

/// Collapse a single node. Returns false (and leaves the flag clear) when the
/// node is a leaf or unknown, since there is nothing to hide.
pub fn collapse(map: &mut MindMap, id: NodeId) -> bool {
    match map.node_mut(id) {
        Some(node) if node.has_children() => {
            node.collapsed = true;
            true
        }
        _ => false,
    }
}

/// Expand a single node. Returns whether the flag changed.
pub fn expand(map: &mut MindMap, id: NodeId) -> bool {
    match map.node_mut(id) {
        Some(node) if node.collapsed => {
            node.collapsed = false;
            true
        }
        _ => false,
    }
}

/// The focus operation: force-collapse every sibling subtree of `id` except
/// `id`'s own, recursively and bottom-up. Distinct from [`collapse`], which
/// touches one flag; this one mutates many.
pub fn collapse_other_siblings(map: &mut MindMap, id: NodeId) {
    let Some(parent) = map.node(id).and_then(|n| n.parent) else {
        return;
    };
    let siblings: Vec<NodeId> = map
        .children(parent)
        .iter()
        .copied()
        .filter(|&c| c != id)
        .collect();
    for sibling in siblings {
        collapse_subtree(map, sibling);
    }
}

// Children first so re-expanding a sibling later reveals a fully collapsed
// interior rather than a half-open one.
fn collapse_subtree(map: &mut MindMap, id: NodeId) {
    let children: Vec<NodeId> = map.children(id).to_vec();
    for child in children {
        collapse_subtree(map, child);
    }
    if let Some(node) = map.node_mut(id)
        && node.has_children()
    {
        node.collapsed = true;
    }
}

/// Ids of every visible node, in the map's insertion order.
pub fn visible_ids(map: &MindMap) -> Vec<NodeId> {
    map.iter()
        .map(|n| n.id)
        .filter(|&id| is_visible(map, id))
        .collect()
}
