//! Types crossing the host boundary: the AI collaborator's nested outline
//! and the signals the engine raises back to the host.

use mm_core::NodeId;
use serde::Deserialize;

/// A cited source attached to an outline entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutlineSource {
    pub name: String,
    pub link: String,
}

/// Nested structure returned by the AI collaborator, batch-created as a
/// child subtree. Each entry becomes a node titled by `header`, with notes
/// combining the description and a formatted source list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutlineNode {
    pub header: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sources: Vec<OutlineSource>,
    #[serde(default)]
    pub children: Vec<OutlineNode>,
}

/// Requests the engine raises to the host instead of handling itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSignal {
    /// Open the node-detail dialog for this node.
    OpenNodeDetails(NodeId),
    /// The user tapped the elaborate control; `context` is the titles along
    /// the root path, joined for the prompt.
    ElaborationRequested { id: NodeId, context: String },
}
