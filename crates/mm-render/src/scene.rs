//! The retained display surface: z-ordered node visuals plus routed
//! connector paths. Connectors always draw behind nodes; among nodes,
//! insertion order is z-order and later visuals sit on top.

use crate::connector::ConnectorPath;
use crate::visual::NodeVisual;
use mm_core::model::{MindMap, Point};
use mm_core::{visibility, NodeId};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Scene {
    visuals: Vec<NodeVisual>,
    index: HashMap<NodeId, usize>,
    connectors: Vec<ConnectorPath>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a visual, replacing any existing one for the same node in place
    /// (keeping its z position).
    pub fn insert(&mut self, visual: NodeVisual) {
        match self.index.get(&visual.id) {
            Some(&i) => self.visuals[i] = visual,
            None => {
                self.index.insert(visual.id, self.visuals.len());
                self.visuals.push(visual);
            }
        }
    }

    /// Drop a visual and every connector path touching it. Called when the
    /// owning node is deleted.
    pub fn remove(&mut self, id: NodeId) {
        if self.index.remove(&id).is_none() {
            return;
        }
        self.visuals.retain(|v| v.id != id);
        self.connectors.retain(|c| c.from != id && c.to != id);
        self.reindex();
    }

    pub fn visual(&self, id: NodeId) -> Option<&NodeVisual> {
        self.index.get(&id).map(|&i| &self.visuals[i])
    }

    pub fn visual_mut(&mut self, id: NodeId) -> Option<&mut NodeVisual> {
        self.index.get(&id).copied().map(|i| &mut self.visuals[i])
    }

    /// Visuals bottom-to-top.
    pub fn visuals(&self) -> &[NodeVisual] {
        &self.visuals
    }

    pub fn connectors(&self) -> &[ConnectorPath] {
        &self.connectors
    }

    pub(crate) fn set_connectors(&mut self, connectors: Vec<ConnectorPath>) {
        self.connectors = connectors;
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    pub fn clear(&mut self) {
        self.visuals.clear();
        self.index.clear();
        self.connectors.clear();
    }

    /// Move one visual, keeping its derived metrics.
    pub fn set_position(&mut self, id: NodeId, pos: Point) {
        if let Some(v) = self.visual_mut(id) {
            v.pos = pos;
        }
    }

    /// Measured heights for the layout pass. Nodes without a visual yet
    /// report `None` and fall back to the layout default.
    pub fn measured_heights(&self) -> HashMap<NodeId, f32> {
        self.visuals.iter().map(|v| (v.id, v.height)).collect()
    }

    /// Mirror the model's collapse state onto the surface: hidden nodes get
    /// `visible = false`, connector paths with a hidden endpoint are dropped.
    /// The model is never touched.
    pub fn apply_visibility(&mut self, map: &MindMap) {
        for v in &mut self.visuals {
            v.visible = visibility::is_visible(map, v.id);
        }
        let visible: HashMap<NodeId, bool> = self
            .visuals
            .iter()
            .map(|v| (v.id, v.visible))
            .collect();
        self.connectors.retain(|c| {
            visible.get(&c.from).copied().unwrap_or(false)
                && visible.get(&c.to).copied().unwrap_or(false)
        });
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, v) in self.visuals.iter().enumerate() {
            self.index.insert(v.id, i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::route_connections;
    use mm_core::model::{MindMap, NodeSize};
    use pretty_assertions::assert_eq;

    fn scene_for(map: &MindMap) -> Scene {
        let mut scene = Scene::new();
        for node in map.iter() {
            scene.insert(NodeVisual::build(node));
        }
        scene
    }

    #[test]
    fn insert_replaces_in_place_preserving_z_order() {
        let mut map = MindMap::new();
        let root = map
            .create_node(Point::default(), "r", None, NodeSize::Medium, None)
            .unwrap();
        let a = map
            .create_node(Point::default(), "a", Some(root), NodeSize::Medium, None)
            .unwrap();
        let mut scene = scene_for(&map);

        if let Some(n) = map.node_mut(root) {
            n.title = "renamed".into();
        }
        scene.insert(NodeVisual::build(map.node(root).unwrap()));

        assert_eq!(scene.len(), 2);
        assert_eq!(scene.visuals()[0].id, root, "root kept its z slot");
        assert_eq!(scene.visuals()[1].id, a);
        assert_eq!(scene.visual(root).unwrap().label_lines, vec!["renamed"]);
    }

    #[test]
    fn remove_drops_the_visual_and_touching_connectors() {
        let mut map = MindMap::new();
        let root = map
            .create_node(Point::default(), "r", None, NodeSize::Medium, None)
            .unwrap();
        let a = map
            .create_node(Point::new(300.0, 0.0), "a", Some(root), NodeSize::Medium, None)
            .unwrap();
        let mut scene = scene_for(&map);
        route_connections(&map, &mut scene);
        assert_eq!(scene.connectors().len(), 1);

        scene.remove(a);
        assert!(scene.visual(a).is_none());
        assert!(scene.connectors().is_empty());
        assert!(scene.visual(root).is_some());
    }

    #[test]
    fn apply_visibility_mirrors_collapse_without_touching_the_model() {
        let mut map = MindMap::new();
        let root = map
            .create_node(Point::default(), "r", None, NodeSize::Medium, None)
            .unwrap();
        let a = map
            .create_node(Point::new(300.0, 0.0), "a", Some(root), NodeSize::Medium, None)
            .unwrap();
        let a1 = map
            .create_node(Point::new(600.0, 0.0), "a1", Some(a), NodeSize::Medium, None)
            .unwrap();
        let mut scene = scene_for(&map);
        route_connections(&map, &mut scene);

        mm_core::visibility::collapse(&mut map, a);
        scene.apply_visibility(&map);

        assert!(scene.visual(a).unwrap().visible);
        assert!(!scene.visual(a1).unwrap().visible);
        assert_eq!(scene.connectors().len(), 1);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn measured_heights_feed_the_layout_fallback_path() {
        let mut map = MindMap::new();
        map.create_node(Point::default(), "r", None, NodeSize::Medium, None)
            .unwrap();
        let scene = scene_for(&map);
        let heights = scene.measured_heights();
        assert_eq!(heights.len(), 1);
        assert!(heights.values().all(|h| *h > 0.0));
    }
}
