//! Portable JSON document: deterministic export, tolerant import.
//!
//! The on-disk shape matches the legacy format: top-level `nodes`,
//! `connections`, `nodeIdCounter`, with camelCase per-node keys. Export walks
//! the map in insertion order so equal trees serialize identically. Import
//! rebuilds a fresh map and drops bad records individually instead of
//! aborting, so one damaged entry never loses the rest of the document.

use crate::id::NodeId;
use crate::model::{
    Color, MediaFile, MindMap, NodeSize, Point, DEFAULT_NODE_FILL, DEFAULT_TEXT_COLOR,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Box tint for collapsed nodes, written into exported records. Channels
/// sit exactly on the 1/255 grid so the hex serde round-trip is lossless.
pub const COLLAPSED_FILL: Color = Color::rgba(1.0, 246.0 / 255.0, 219.0 / 255.0, 1.0);

// ─── Records ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub media: Vec<MediaFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub size: NodeSize,
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default = "default_fill")]
    pub background_color: Color,
    #[serde(default = "default_text")]
    pub text_color: Color,
    #[serde(default)]
    pub is_collapsed: bool,
}

fn default_fill() -> Color {
    DEFAULT_NODE_FILL
}

fn default_text() -> Color {
    DEFAULT_TEXT_COLOR
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub from: NodeId,
    pub to: NodeId,
}

/// The complete document. `nodes` and `connections` are required keys; a
/// document missing either fails to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    pub nodes: Vec<NodeRecord>,
    pub connections: Vec<ConnectionRecord>,
    #[serde(default)]
    pub node_id_counter: u64,
}

impl MapDocument {
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        serde_json::from_str(json).map_err(ImportError::Parse)
    }

    pub fn to_json(&self) -> Result<String, ImportError> {
        serde_json::to_string_pretty(self).map_err(ImportError::Parse)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ImportError {
    /// Malformed JSON, or a document missing `nodes`/`connections`.
    Parse(serde_json::Error),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Parse(err) => write!(f, "document is not a valid mind map: {err}"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Parse(err) => Some(err),
        }
    }
}

// ─── Export ──────────────────────────────────────────────────────────────

/// Serialize the map. Deterministic: nodes in insertion order, connections
/// in creation order, colors derived from state (collapsed tint vs default
/// fill) rather than read back from visuals.
pub fn export_document(map: &MindMap) -> MapDocument {
    let nodes = map
        .iter()
        .map(|node| NodeRecord {
            id: node.id,
            x: node.pos.x,
            y: node.pos.y,
            title: node.title.clone(),
            notes: node.notes.clone(),
            media: node.media.clone(),
            ai_summary: node.ai_summary.clone(),
            size: node.size,
            parent_id: node.parent,
            children: node.children.to_vec(),
            background_color: if node.collapsed {
                COLLAPSED_FILL
            } else {
                DEFAULT_NODE_FILL
            },
            text_color: DEFAULT_TEXT_COLOR,
            is_collapsed: node.collapsed,
        })
        .collect();

    let connections = map
        .connections()
        .iter()
        .map(|c| ConnectionRecord {
            from: c.from,
            to: c.to,
        })
        .collect();

    MapDocument {
        nodes,
        connections,
        node_id_counter: map.id_counter(),
    }
}

// ─── Import ──────────────────────────────────────────────────────────────

/// Rebuild a map from a document. Always returns a fresh map; the caller
/// swaps it in only after this succeeds, so a failed parse never disturbs
/// the previous tree.
///
/// Three passes: create nodes in document order with their forced ids
/// (records with a duplicate id or an unknown parent are skipped with a
/// warning), then recreate connections from the document's own list
/// (dropping entries with a missing endpoint), then patch secondary fields.
/// The id counter is restored last, clamped above the largest surviving id.
pub fn import_document(doc: &MapDocument) -> MindMap {
    let mut map = MindMap::new();

    for record in &doc.nodes {
        let title = if record.title.is_empty() {
            "Node"
        } else {
            &record.title
        };
        let result = map.insert_node(
            Point::new(record.x, record.y),
            title,
            record.parent_id,
            record.size,
            Some(record.id),
        );
        if let Err(err) = result {
            log::warn!("skipping node record {}: {err}", record.id);
        }
    }

    for conn in &doc.connections {
        if !map.add_connection(conn.from, conn.to) {
            log::warn!("dropping connection {} -> {}", conn.from, conn.to);
        }
    }

    for record in &doc.nodes {
        let Some(node) = map.node_mut(record.id) else {
            continue;
        };
        node.notes = record.notes.clone();
        node.media = record.media.clone();
        node.ai_summary = record.ai_summary.clone();
        if record.is_collapsed && node.has_children() {
            node.collapsed = true;
        }
    }

    map.restore_counter(doc.node_id_counter);
    map
}
