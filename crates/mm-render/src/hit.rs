//! Point → node / control hit testing over the retained scene.

use crate::scene::Scene;
use crate::visual::{ControlKind, NodeVisual};
use kurbo::Point as KPoint;
use mm_core::NodeId;

/// Icon diameter of the standard control buttons.
const CONTROL_SIZE: f64 = 24.0;
/// The elaborate button renders slightly larger.
const ELABORATE_SIZE: f64 = 30.0;
/// How far the edge-anchored buttons sit outside the box.
const CONTROL_OFFSET: f64 = 20.0;

/// Topmost visible visual containing `point`, world coordinates. Later
/// insertions sit higher, so the scan runs back-to-front.
pub fn hit_test(scene: &Scene, point: KPoint) -> Option<NodeId> {
    scene
        .visuals()
        .iter()
        .rev()
        .find(|v| v.visible && v.bounds().contains(point))
        .map(|v| v.id)
}

/// Test a point against the control affordances of one (selected) visual.
/// Only controls currently shown for the node can be hit.
pub fn control_hit(visual: &NodeVisual, point: KPoint) -> Option<ControlKind> {
    if !visual.visible {
        return None;
    }
    let b = visual.bounds();
    let candidates = [
        (
            visual.controls.add_child,
            ControlKind::AddChild,
            KPoint::new(b.x1 + CONTROL_OFFSET, (b.y0 + b.y1) / 2.0),
            CONTROL_SIZE,
        ),
        (
            visual.controls.elaborate,
            ControlKind::Elaborate,
            KPoint::new(b.x1, b.y0),
            ELABORATE_SIZE,
        ),
        (
            visual.controls.collapse,
            ControlKind::Collapse,
            KPoint::new((b.x0 + b.x1) / 2.0, b.y1 + CONTROL_OFFSET),
            CONTROL_SIZE,
        ),
        (
            visual.controls.expand,
            ControlKind::Expand,
            KPoint::new((b.x0 + b.x1) / 2.0, b.y1 + CONTROL_OFFSET),
            CONTROL_SIZE,
        ),
    ];
    for (shown, kind, center, size) in candidates {
        if shown && point.distance(center) <= size / 2.0 {
            return Some(kind);
        }
    }
    None
}
