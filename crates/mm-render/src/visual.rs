//! Per-node visuals: the box, the wrapped label, and the on-canvas controls.
//!
//! A `NodeVisual` is the model node's on-screen stand-in. The scene owns it
//! exclusively; the visual carries the node id back as a plain reference for
//! event correlation and holds no other link to the model.

use kurbo::Rect;
use mm_core::doc::COLLAPSED_FILL;
use mm_core::model::{
    Color, MindNode, Point, CANVAS_BACKGROUND, DEFAULT_NODE_FILL, DEFAULT_TEXT_COLOR,
};
use mm_core::NodeId;

/// Label wrap width, in world units.
const LABEL_MAX_WIDTH: f32 = 250.0;
/// Lines beyond this are cut, with a trailing ellipsis when text remains.
const LABEL_MAX_LINES: usize = 5;
/// Wrapping estimates character width against the medium tier's font.
const WRAP_CHAR_WIDTH: f32 = 16.0 * 0.6;
/// Rendered line height as a multiple of font size.
const LINE_HEIGHT: f32 = 1.16;

/// Convert the model's serializable color into the paint vocabulary handed
/// to the host renderer.
pub fn to_peniko(c: Color) -> peniko::Color {
    peniko::Color::from_rgba8(
        (c.r * 255.0).round() as u8,
        (c.g * 255.0).round() as u8,
        (c.b * 255.0).round() as u8,
        (c.a * 255.0).round() as u8,
    )
}

/// Clear color the host paints behind the whole scene.
pub fn canvas_background() -> peniko::Color {
    to_peniko(CANVAS_BACKGROUND)
}

// ─── Label wrapping ──────────────────────────────────────────────────────

/// Word-wrap a title into display lines. Breaks at the last space that fits,
/// or mid-word when a single word overflows the line. Stops after
/// [`LABEL_MAX_LINES`]; when more text than one further line remains, the
/// last line gets an ellipsis appended.
pub fn wrap_label(text: &str) -> Vec<String> {
    let max_chars = (LABEL_MAX_WIDTH / WRAP_CHAR_WIDTH) as usize;
    let mut lines: Vec<String> = Vec::new();
    let mut remaining: &str = text;

    while !remaining.is_empty() && lines.len() < LABEL_MAX_LINES {
        let chars: Vec<char> = remaining.chars().collect();
        if chars.len() <= max_chars {
            lines.push(remaining.to_string());
            remaining = "";
            break;
        }
        let window: String = chars[..=max_chars.min(chars.len() - 1)].iter().collect();
        let break_at = match window.rfind(' ') {
            Some(0) | None => max_chars,
            Some(i) => window[..i].chars().count(),
        };
        let line: String = chars[..break_at].iter().collect();
        lines.push(line);
        let consumed: usize = chars[..break_at].iter().map(|c| c.len_utf8()).sum();
        remaining = remaining[consumed..].trim_start();
    }

    if remaining.chars().count() > max_chars
        && let Some(last) = lines.last_mut()
    {
        last.push_str("...");
    }
    lines
}

// ─── Controls ────────────────────────────────────────────────────────────

/// Which on-canvas affordance a hit landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Right-edge button: create a child under this node.
    AddChild,
    /// Corner lightning button: ask the AI collaborator about this node.
    Elaborate,
    /// Bottom button on an expanded parent: hide the subtree.
    Collapse,
    /// Bottom button on a collapsed parent: reveal the subtree and focus it.
    Expand,
}

/// Visibility of each affordance, derived from the node's state when it is
/// selected. Leaves get no collapse or expand button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub add_child: bool,
    pub elaborate: bool,
    pub collapse: bool,
    pub expand: bool,
}

impl Controls {
    pub fn for_node(node: &MindNode) -> Self {
        Self {
            add_child: !node.collapsed,
            elaborate: true,
            collapse: node.has_children() && !node.collapsed,
            expand: node.has_children() && node.collapsed,
        }
    }
}

// ─── The visual ──────────────────────────────────────────────────────────

/// Retained on-screen representation of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisual {
    /// Non-owning back-reference to the model node.
    pub id: NodeId,
    /// Box center, world coordinates. Kept in sync with the model after
    /// every layout pass or drag.
    pub pos: Point,
    pub width: f32,
    pub height: f32,
    pub label_lines: Vec<String>,
    pub font_size: f32,
    /// Roots render with a heavy weight.
    pub bold: bool,
    pub fill: peniko::Color,
    pub text_color: peniko::Color,
    pub accent: peniko::Color,
    pub visible: bool,
    pub controls: Controls,
}

impl NodeVisual {
    /// Build a visual from a model node. Box dimensions are the size tier's
    /// intrinsic dimensions padded by the wrapped label's estimated metrics.
    pub fn build(node: &MindNode) -> Self {
        let spec = node.size.spec();
        let lines = wrap_label(&node.title);
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let text_width = longest as f32 * spec.font_size * 0.6;
        let text_height = lines.len().max(1) as f32 * spec.font_size * LINE_HEIGHT;

        Self {
            id: node.id,
            pos: node.pos,
            width: spec.width + text_width,
            height: spec.height + text_height,
            label_lines: lines,
            font_size: spec.font_size,
            bold: node.is_root(),
            fill: Self::fill_for(node),
            text_color: to_peniko(DEFAULT_TEXT_COLOR),
            accent: to_peniko(node.color),
            visible: true,
            controls: Controls::for_node(node),
        }
    }

    /// Refresh everything derived from the model node, keeping visibility.
    pub fn sync_from_node(&mut self, node: &MindNode) {
        let visible = self.visible;
        *self = Self::build(node);
        self.visible = visible;
    }

    fn fill_for(node: &MindNode) -> peniko::Color {
        if node.collapsed {
            to_peniko(COLLAPSED_FILL)
        } else {
            to_peniko(DEFAULT_NODE_FILL)
        }
    }

    /// Axis-aligned box around the visual, world coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            (self.pos.x - self.width / 2.0) as f64,
            (self.pos.y - self.height / 2.0) as f64,
            (self.pos.x + self.width / 2.0) as f64,
            (self.pos.y + self.height / 2.0) as f64,
        )
    }
}
