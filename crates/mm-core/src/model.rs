//! Core mind-map data model.
//!
//! A mind map is a forest of labeled nodes on an infinite canvas. Every node
//! except a root keeps a back-reference to its parent, and every parent→child
//! edge is mirrored by exactly one [`Connection`] owned by the map. Positions
//! are world coordinates and are written only by the layout calculator or by
//! a direct drag — nothing else computes them ad hoc.

use crate::id::{IdAllocator, NodeId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::fmt;

// ─── Colors ──────────────────────────────────────────────────────────────

/// Default node box fill.
pub const DEFAULT_NODE_FILL: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
/// Default label color.
pub const DEFAULT_TEXT_COLOR: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
/// Canvas background, on the 1/255 grid like every serialized color.
pub const CANVAS_BACKGROUND: Color = Color::rgba(216.0 / 255.0, 218.0 / 255.0, 222.0 / 255.0, 1.0);

/// RGBA color, 4 × f32 in [0.0, 1.0]. Serialized as a hex string so
/// documents stay readable and compatible with the legacy format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgba(
                    (r * 17) as f32 / 255.0,
                    (g * 17) as f32 / 255.0,
                    (b * 17) as f32 / 255.0,
                    1.0,
                ))
            }
            6 | 8 => {
                let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                let a = if bytes.len() == 8 {
                    hex_val(bytes[6])? << 4 | hex_val(bytes[7])?
                } else {
                    255
                };
                Some(Self::rgba(
                    r as f32 / 255.0,
                    g as f32 / 255.0,
                    b as f32 / 255.0,
                    a as f32 / 255.0,
                ))
            }
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let r = (self.r * 255.0).round() as u8;
        let g = (self.g * 255.0).round() as u8;
        let b = (self.b * 255.0).round() as u8;
        let a = (self.a * 255.0).round() as u8;
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// HSL → RGB. `h` in degrees, `s` and `l` in [0.0, 1.0].
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = (h.rem_euclid(360.0)) / 360.0;
        if s == 0.0 {
            return Self::rgba(l, l, l, 1.0);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let hue_to_rgb = |p: f32, q: f32, mut t: f32| -> f32 {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 1.0 / 2.0 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            }
        };
        Self::rgba(
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
            1.0,
        )
    }

    /// The stable accent color for a node, assigned once at creation and
    /// never recomputed. Golden-angle hue stepping over the id spreads
    /// neighboring nodes far apart on the wheel; saturation and lightness
    /// sit in the bright-but-readable band used for connector strokes.
    pub fn accent_for(id: NodeId) -> Self {
        let hue = (id.raw() as f32 * 137.508).rem_euclid(360.0);
        Self::from_hsl(hue, 0.78, 0.48)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color {s:?}")))
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// A point in canvas world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ─── Node sizing ─────────────────────────────────────────────────────────

/// Size tier controlling a node's intrinsic box dimensions. Roots are
/// forced to `Large` at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSize {
    Small,
    #[default]
    Medium,
    Large,
    Xlarge,
}

/// Intrinsic dimensions for a size tier, before label metrics are added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeSpec {
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
}

impl NodeSize {
    pub fn spec(self) -> SizeSpec {
        match self {
            NodeSize::Small => SizeSpec {
                width: 120.0,
                height: 50.0,
                font_size: 14.0,
            },
            NodeSize::Medium => SizeSpec {
                width: 150.0,
                height: 60.0,
                font_size: 16.0,
            },
            NodeSize::Large => SizeSpec {
                width: 180.0,
                height: 70.0,
                font_size: 24.0,
            },
            NodeSize::Xlarge => SizeSpec {
                width: 220.0,
                height: 85.0,
                font_size: 32.0,
            },
        }
    }
}

// ─── Media ───────────────────────────────────────────────────────────────

/// An attachment on a node: inline-encoded content plus a MIME type.
/// Opaque to layout. Serialized under the legacy `name`/`url`/`type` keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    pub name: String,
    #[serde(rename = "url")]
    pub data: String,
    #[serde(rename = "type")]
    pub mime: String,
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A single mind-map node.
///
/// The on-screen visual lives in the render scene, keyed by `id`; the model
/// never holds a handle to it. The scene's visual carries the id back as a
/// plain, non-owning reference for event correlation.
#[derive(Debug, Clone, PartialEq)]
pub struct MindNode {
    pub id: NodeId,
    /// `None` marks a root. Roots are never collapsed away.
    pub parent: Option<NodeId>,
    /// Child ids in insertion order — visual top-to-bottom order at that level.
    pub children: SmallVec<[NodeId; 4]>,
    /// Center position in world coordinates.
    pub pos: Point,
    pub size: NodeSize,
    pub title: String,
    pub notes: String,
    pub media: Vec<MediaFile>,
    /// AI elaboration text, if any was requested for this node.
    pub ai_summary: Option<String>,
    /// Stable accent color, assigned at creation. Tints outgoing connectors.
    pub color: Color,
    /// When set, the node's descendants are excluded from layout and hidden
    /// from rendering. The node itself stays visible.
    pub collapsed: bool,
}

impl MindNode {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// A closed update applied to a node after editing in the detail dialog.
/// Only `Some` fields are merged; everything else is left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub media: Option<Vec<MediaFile>>,
    pub collapsed: Option<bool>,
    pub ai_summary: Option<String>,
}

impl NodeUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.notes.is_none()
            && self.media.is_none()
            && self.collapsed.is_none()
            && self.ai_summary.is_none()
    }
}

// ─── Connections ─────────────────────────────────────────────────────────

/// A directed parent→child edge. Exactly one exists per non-root node.
/// Curve geometry is built lazily by the connection router and owned by the
/// render scene; the logical edge list here survives visibility changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
}

// ─── Errors ──────────────────────────────────────────────────────────────

/// A structural operation the tree refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Attempt to delete the central node. Surfaced to the user as a
    /// refusal, never as a crash; the model is left unchanged.
    RootDeletion,
    /// The referenced node does not exist (possibly already deleted).
    UnknownNode(NodeId),
    /// A forced id collided with an existing node.
    DuplicateId(NodeId),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::RootDeletion => write!(f, "the central node cannot be deleted"),
            TreeError::UnknownNode(id) => write!(f, "no node with id {id}"),
            TreeError::DuplicateId(id) => write!(f, "a node with id {id} already exists"),
        }
    }
}

impl std::error::Error for TreeError {}

// ─── The map ─────────────────────────────────────────────────────────────

/// The complete in-memory tree: nodes in insertion order, an id index for
/// O(1) lookup, the logical connection list, and the id counter.
#[derive(Debug, Clone, Default)]
pub struct MindMap {
    nodes: Vec<MindNode>,
    index: HashMap<NodeId, usize>,
    connections: Vec<Connection>,
    allocator: IdAllocator,
}

impl MindMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node and wire it into the tree.
    ///
    /// Maintains the parent's `children` back-reference and creates the
    /// parent→child connection. A `forced` id (restore paths) bumps the
    /// allocator past itself so it can never be reissued. Roots are forced
    /// to the large size tier.
    pub fn create_node(
        &mut self,
        pos: Point,
        title: &str,
        parent: Option<NodeId>,
        size: NodeSize,
        forced: Option<NodeId>,
    ) -> Result<NodeId, TreeError> {
        let id = self.insert_node(pos, title, parent, size, forced)?;
        if let Some(pid) = parent {
            self.connections.push(Connection { from: pid, to: id });
        }
        Ok(id)
    }

    /// Node creation without the automatic parent connection. Document
    /// import recreates connections from the serialized list instead of
    /// re-deriving them, so it goes through this path.
    pub(crate) fn insert_node(
        &mut self,
        pos: Point,
        title: &str,
        parent: Option<NodeId>,
        size: NodeSize,
        forced: Option<NodeId>,
    ) -> Result<NodeId, TreeError> {
        if let Some(pid) = parent
            && !self.index.contains_key(&pid)
        {
            return Err(TreeError::UnknownNode(pid));
        }

        let id = match forced {
            Some(id) => {
                if self.index.contains_key(&id) {
                    return Err(TreeError::DuplicateId(id));
                }
                self.allocator.ensure_above(id);
                id
            }
            None => self.allocate_unused(),
        };

        let size = if parent.is_none() { NodeSize::Large } else { size };
        let node = MindNode {
            id,
            parent,
            children: SmallVec::new(),
            pos,
            size,
            title: title.to_string(),
            notes: String::new(),
            media: Vec::new(),
            ai_summary: None,
            color: Color::accent_for(id),
            collapsed: false,
        };

        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        if let Some(pid) = parent {
            // Checked above; the parent is present.
            if let Some(p) = self.node_mut(pid) {
                p.children.push(id);
            }
        }
        Ok(id)
    }

    /// Allocate the next id, skipping any already present (a restored
    /// document may have claimed ids above the counter).
    fn allocate_unused(&mut self) -> NodeId {
        loop {
            let id = self.allocator.allocate();
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }

    /// Delete a node and its entire subtree, along with every connection
    /// touching the removed set. Returns the removed ids so the caller can
    /// drop the matching visuals.
    pub fn delete_node(&mut self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let node = self.node(id).ok_or(TreeError::UnknownNode(id))?;
        if node.is_root() {
            return Err(TreeError::RootDeletion);
        }
        let parent = node.parent;

        let removed = self.subtree_ids(id);
        let removed_set: HashSet<NodeId> = removed.iter().copied().collect();

        self.connections
            .retain(|c| !removed_set.contains(&c.from) && !removed_set.contains(&c.to));

        if let Some(pid) = parent
            && let Some(p) = self.node_mut(pid)
        {
            p.children.retain(|c| *c != id);
        }

        self.nodes.retain(|n| !removed_set.contains(&n.id));
        self.rebuild_index();
        Ok(removed)
    }

    /// Preorder ids of a subtree, including `id` itself. Ignores collapse
    /// state — this is the structural subtree, not the visible one.
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(node) = self.node(cur) {
                out.push(cur);
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        out
    }

    pub fn node(&self, id: NodeId) -> Option<&MindNode> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut MindNode> {
        self.index.get(&id).copied().map(|i| &mut self.nodes[i])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Nodes in insertion order (deterministic export order).
    pub fn iter(&self) -> impl Iterator<Item = &MindNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root ids in insertion order. The primary root comes first.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.is_root())
            .map(|n| n.id)
            .collect()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Add a connection if both endpoints exist and the edge is not already
    /// present. Returns whether the edge was added. Used when restoring a
    /// document's connection list, which may reference dropped records.
    pub fn add_connection(&mut self, from: NodeId, to: NodeId) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        let edge = Connection { from, to };
        if self.connections.contains(&edge) {
            return false;
        }
        self.connections.push(edge);
        true
    }

    /// Merge a validated update into a node. A `collapsed = true` on a node
    /// with no children is dropped — there is nothing to hide.
    pub fn apply_update(&mut self, id: NodeId, update: NodeUpdate) -> Result<(), TreeError> {
        let node = self.node_mut(id).ok_or(TreeError::UnknownNode(id))?;
        if let Some(title) = update.title {
            node.title = title;
        }
        if let Some(notes) = update.notes {
            node.notes = notes;
        }
        if let Some(media) = update.media {
            node.media = media;
        }
        if let Some(summary) = update.ai_summary {
            node.ai_summary = Some(summary);
        }
        if let Some(collapsed) = update.collapsed {
            if !collapsed || node.has_children() {
                node.collapsed = collapsed;
            }
        }
        Ok(())
    }

    /// Atomic append of a decoded attachment. Completion order across
    /// concurrent decodes is unspecified; each append stands alone.
    pub fn add_media(&mut self, id: NodeId, media: MediaFile) -> Result<(), TreeError> {
        let node = self.node_mut(id).ok_or(TreeError::UnknownNode(id))?;
        node.media.push(media);
        Ok(())
    }

    /// The current id counter (exported with the document).
    pub fn id_counter(&self) -> u64 {
        self.allocator.peek()
    }

    /// Restore the counter from a document, clamped so existing ids are
    /// never reissued.
    pub fn restore_counter(&mut self, counter: u64) {
        let max_existing = self.nodes.iter().map(|n| n.id).max();
        self.allocator = IdAllocator::restore(counter, max_existing);
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, node) in self.nodes.iter().enumerate() {
            self.index.insert(node.id, i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_map() -> (MindMap, NodeId, NodeId, NodeId, NodeId) {
        let mut map = MindMap::new();
        let root = map
            .create_node(Point::new(0.0, 0.0), "Root", None, NodeSize::Medium, None)
            .unwrap();
        let a = map
            .create_node(Point::new(0.0, 0.0), "A", Some(root), NodeSize::Medium, None)
            .unwrap();
        let b = map
            .create_node(Point::new(0.0, 0.0), "B", Some(root), NodeSize::Medium, None)
            .unwrap();
        let b1 = map
            .create_node(Point::new(0.0, 0.0), "B1", Some(b), NodeSize::Medium, None)
            .unwrap();
        (map, root, a, b, b1)
    }

    #[test]
    fn create_wires_back_references_and_connections() {
        let (map, root, a, b, b1) = sample_map();

        assert_eq!(map.children(root), &[a, b]);
        assert_eq!(map.children(b), &[b1]);
        assert_eq!(map.node(a).unwrap().parent, Some(root));
        assert_eq!(
            map.connections(),
            &[
                Connection { from: root, to: a },
                Connection { from: root, to: b },
                Connection { from: b, to: b1 },
            ]
        );
    }

    #[test]
    fn root_gets_large_tier() {
        let (map, root, a, ..) = sample_map();
        assert_eq!(map.node(root).unwrap().size, NodeSize::Large);
        assert_eq!(map.node(a).unwrap().size, NodeSize::Medium);
    }

    #[test]
    fn delete_cascades_through_subtree() {
        let (mut map, root, a, b, b1) = sample_map();

        let removed = map.delete_node(b).unwrap();
        assert_eq!(removed, vec![b, b1]);
        assert!(map.node(b).is_none());
        assert!(map.node(b1).is_none());
        // No dangling children reference on the survivor
        assert_eq!(map.children(root), &[a]);
        // Only the root→a edge survives
        assert_eq!(map.connections(), &[Connection { from: root, to: a }]);
    }

    #[test]
    fn root_deletion_is_refused() {
        let (mut map, root, ..) = sample_map();
        let before = map.len();
        assert_eq!(map.delete_node(root), Err(TreeError::RootDeletion));
        assert_eq!(map.len(), before);
    }

    #[test]
    fn unknown_ids_signal_not_found() {
        let (mut map, ..) = sample_map();
        let ghost = NodeId::from_raw(999);
        assert_eq!(map.delete_node(ghost), Err(TreeError::UnknownNode(ghost)));
        assert_eq!(
            map.apply_update(ghost, NodeUpdate::default()),
            Err(TreeError::UnknownNode(ghost))
        );
    }

    #[test]
    fn deleted_ids_are_never_reused() {
        let (mut map, root, _, b, _) = sample_map();
        map.delete_node(b).unwrap();
        let next = map
            .create_node(Point::new(0.0, 0.0), "C", Some(root), NodeSize::Small, None)
            .unwrap();
        assert!(next.raw() > b.raw());
    }

    #[test]
    fn forced_id_collision_is_an_error() {
        let (mut map, root, a, ..) = sample_map();
        let err = map
            .create_node(
                Point::new(0.0, 0.0),
                "dup",
                Some(root),
                NodeSize::Small,
                Some(a),
            )
            .unwrap_err();
        assert_eq!(err, TreeError::DuplicateId(a));
    }

    #[test]
    fn collapse_update_on_leaf_is_dropped() {
        let (mut map, _, a, b, _) = sample_map();
        map.apply_update(
            a,
            NodeUpdate {
                collapsed: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!map.node(a).unwrap().collapsed, "leaf has nothing to hide");

        map.apply_update(
            b,
            NodeUpdate {
                collapsed: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(map.node(b).unwrap().collapsed);
    }

    #[test]
    fn accent_colors_are_stable_per_id() {
        let a = Color::accent_for(NodeId::from_raw(3));
        let b = Color::accent_for(NodeId::from_raw(3));
        let c = Color::accent_for(NodeId::from_raw(4));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#6C5CE7").unwrap();
        assert_eq!(c.to_hex(), "#6C5CE7");
        assert_eq!(Color::from_hex("fff").unwrap().to_hex(), "#FFFFFF");
        assert!(Color::from_hex("#12345").is_none());
    }

    #[test]
    fn named_colors_sit_on_the_hex_grid() {
        // Any off-grid channel would come back changed after a serialize
        // and reparse, breaking exact document round-trips.
        for c in [DEFAULT_NODE_FILL, DEFAULT_TEXT_COLOR, CANVAS_BACKGROUND] {
            assert_eq!(Color::from_hex(&c.to_hex()), Some(c));
        }
        assert_eq!(CANVAS_BACKGROUND.to_hex(), "#D8DADE");
    }
}
