//! Recursive overlap-free tree layout.
//!
//! Levels are fixed-width columns; within a column, a per-level cursor tracks
//! the next free Y so nothing overlaps. Nodes are only ever pushed down past
//! an obstruction, never up, preserving top-to-bottom reading order. Parents
//! sit on the midpoint of their first and last child. Collapsed subtrees are
//! skipped entirely and appear nowhere in the output.

use crate::id::NodeId;
use crate::model::{MindMap, Point};
use std::collections::HashMap;

/// Tunables for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Column width between consecutive depth levels.
    pub horizontal_spacing: f32,
    /// Minimum vertical clearance between boxes in the same column.
    pub vertical_gap: f32,
    /// X of the depth-0 column.
    pub start_x: f32,
    /// Height used for nodes whose visual has not been measured yet.
    pub default_node_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 300.0,
            vertical_gap: 40.0,
            start_x: 150.0,
            default_node_height: 100.0,
        }
    }
}

/// Vertical extent of a placed subtree, reported upward during the pass.
#[derive(Debug, Clone, Copy)]
struct SubtreeBounds {
    /// Center Y of the subtree's own root node.
    y: f32,
    min_y: f32,
    max_y: f32,
}

/// Compute positions for every visible node.
///
/// `heights` supplies measured visual heights; `None` falls back to
/// `config.default_node_height` (first pass before text metrics exist).
/// `canvas_height` anchors the primary root at the viewport's vertical
/// middle. The returned map contains visible nodes only.
pub fn compute_layout<F>(
    map: &MindMap,
    heights: F,
    config: &LayoutConfig,
    canvas_height: f32,
) -> HashMap<NodeId, Point>
where
    F: Fn(NodeId) -> Option<f32>,
{
    LayoutPass::new(map, &heights, config).run(canvas_height)
}

/// All intermediate state for one pass. Constructed fresh per call and
/// discarded with it; nothing here outlives the invocation.
struct LayoutPass<'a, F> {
    map: &'a MindMap,
    heights: &'a F,
    config: &'a LayoutConfig,
    next_free_y: HashMap<u32, f32>,
    positions: HashMap<NodeId, Point>,
}

impl<'a, F> LayoutPass<'a, F>
where
    F: Fn(NodeId) -> Option<f32>,
{
    fn new(map: &'a MindMap, heights: &'a F, config: &'a LayoutConfig) -> Self {
        Self {
            map,
            heights,
            config,
            next_free_y: HashMap::new(),
            positions: HashMap::new(),
        }
    }

    fn run(mut self, canvas_height: f32) -> HashMap<NodeId, Point> {
        let roots = self.map.roots();
        match roots.as_slice() {
            [] => {}
            [root] => {
                self.place(*root, self.config.start_x, canvas_height / 2.0, 0);
            }
            many => {
                let total = self.siblings_height(many);
                let mut cursor = canvas_height / 2.0 - total / 2.0;
                for &root in many {
                    let h = self.height_of(root);
                    let bounds = self.place(root, self.config.start_x, cursor + h / 2.0, 0);
                    cursor = bounds.max_y + self.config.vertical_gap;
                }
            }
        }
        log::debug!(
            "layout pass placed {} of {} nodes",
            self.positions.len(),
            self.map.len()
        );
        self.positions
    }

    fn height_of(&self, id: NodeId) -> f32 {
        (self.heights)(id).unwrap_or(self.config.default_node_height)
    }

    /// Stacked height of a sibling run, gaps included.
    fn siblings_height(&self, ids: &[NodeId]) -> f32 {
        let mut total = 0.0;
        for (i, &id) in ids.iter().enumerate() {
            total += self.height_of(id);
            if i + 1 < ids.len() {
                total += self.config.vertical_gap;
            }
        }
        total
    }

    fn place(&mut self, id: NodeId, x: f32, preferred_y: f32, level: u32) -> SubtreeBounds {
        let Some(node) = self.map.node(id) else {
            return SubtreeBounds {
                y: preferred_y,
                min_y: preferred_y,
                max_y: preferred_y,
            };
        };
        let height = self.height_of(id);

        // A collapsed node's children are invisible, so it lays out as a leaf.
        let children: Vec<NodeId> = if node.collapsed {
            Vec::new()
        } else {
            node.children.to_vec()
        };

        if children.is_empty() {
            self.settle(id, x, preferred_y, level, height)
        } else {
            self.place_with_children(id, x, preferred_y, level, height, &children)
        }
    }

    /// Clamp a preferred center to the level cursor (push down only), record
    /// the position, and advance the cursor past the box plus gap.
    fn settle(&mut self, id: NodeId, x: f32, preferred_y: f32, level: u32, height: f32) -> SubtreeBounds {
        let min_allowed = self.next_free_y.get(&level).copied().unwrap_or(f32::NEG_INFINITY);
        let top = (preferred_y - height / 2.0).max(min_allowed);
        let y = top + height / 2.0;
        let bottom = top + height;

        self.positions.insert(id, Point::new(x, y));
        self.next_free_y.insert(level, bottom + self.config.vertical_gap);

        SubtreeBounds {
            y,
            min_y: top,
            max_y: bottom,
        }
    }

    fn place_with_children(
        &mut self,
        id: NodeId,
        x: f32,
        preferred_y: f32,
        level: u32,
        height: f32,
        children: &[NodeId],
    ) -> SubtreeBounds {
        let child_x = x + self.config.horizontal_spacing;
        let total = self.siblings_height(children);

        let mut cursor = preferred_y - total / 2.0;
        let mut first_y = 0.0;
        let mut last_y = 0.0;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for (i, &child) in children.iter().enumerate() {
            let child_h = self.height_of(child);
            let bounds = self.place(child, child_x, cursor + child_h / 2.0, level + 1);

            if i == 0 {
                first_y = bounds.y;
            }
            last_y = bounds.y;
            min_y = min_y.min(bounds.min_y);
            max_y = max_y.max(bounds.max_y);

            cursor = bounds.max_y + self.config.vertical_gap;
        }

        let centered = (first_y + last_y) / 2.0;
        let own = self.settle(id, x, centered, level, height);

        SubtreeBounds {
            y: own.y,
            min_y: own.min_y.min(min_y),
            max_y: own.max_y.max(max_y),
        }
    }
}
