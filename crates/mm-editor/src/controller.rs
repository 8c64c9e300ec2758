//! Interaction state machine: pan gestures, wheel handling, selection, and
//! control taps.
//!
//! The controller never mutates the map or the scene. It folds normalized
//! input into gesture state and emits [`EngineAction`]s for the engine to
//! execute, so every mutation goes through one place.

use crate::camera::Camera;
use crate::input::InputEvent;
use kurbo::Point as KPoint;
use mm_core::model::Point;
use mm_core::NodeId;
use mm_render::{control_hit, hit_test, ControlKind, Scene};

/// Current pointer gesture. Node dragging is native to the scene host and
/// not tracked here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    Panning { last: Point },
}

/// What the engine should do in response to input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineAction {
    Pan { dx: f32, dy: f32 },
    WheelZoom { at: Point, delta: f32 },
    Select(NodeId),
    ClearSelection,
    AddChild(NodeId),
    Collapse(NodeId),
    ExpandFocus(NodeId),
    OpenDetails(NodeId),
    RequestElaboration(NodeId),
    RequestRender,
}

#[derive(Debug, Default)]
pub struct Controller {
    pan_mode: bool,
    gesture: Gesture,
    selected: Option<NodeId>,
}

impl Default for Gesture {
    fn default() -> Self {
        Gesture::Idle
    }
}

impl Controller {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pan_mode(&self) -> bool {
        self.pan_mode
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Drop the selection if it points at a deleted node.
    pub fn prune_selection(&mut self, removed: &[NodeId]) {
        if let Some(sel) = self.selected
            && removed.contains(&sel)
        {
            self.selected = None;
        }
    }

    /// Turning pan mode off mid-gesture must not leave a live drag behind.
    pub fn set_pan_mode(&mut self, enabled: bool) {
        self.pan_mode = enabled;
        if !enabled {
            self.gesture = Gesture::Idle;
        }
    }

    /// Fold one event into the gesture state. Selection and control hits
    /// are resolved against the scene in world coordinates.
    pub fn handle(&mut self, event: InputEvent, scene: &Scene, camera: &Camera) -> Vec<EngineAction> {
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(Point::new(x, y), scene, camera),
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(x, y)),
            InputEvent::PointerUp => {
                if matches!(self.gesture, Gesture::Panning { .. }) {
                    self.gesture = Gesture::Idle;
                }
                Vec::new()
            }
            InputEvent::Wheel {
                x,
                y,
                delta_x,
                delta_y,
                modifiers,
            } => {
                if modifiers.ctrl {
                    vec![EngineAction::WheelZoom {
                        at: Point::new(x, y),
                        delta: delta_y,
                    }]
                } else {
                    vec![
                        EngineAction::Pan {
                            dx: -delta_x,
                            dy: -delta_y,
                        },
                        EngineAction::RequestRender,
                    ]
                }
            }
            InputEvent::DoubleClick { x, y } => {
                let world = camera.screen_to_world(Point::new(x, y));
                match hit_test(scene, KPoint::new(world.x as f64, world.y as f64)) {
                    Some(id) => vec![EngineAction::OpenDetails(id)],
                    None => Vec::new(),
                }
            }
        }
    }

    fn pointer_down(&mut self, screen: Point, scene: &Scene, camera: &Camera) -> Vec<EngineAction> {
        if self.pan_mode {
            // Node hit-testing is suspended for the whole gesture.
            self.gesture = Gesture::Panning { last: screen };
            return Vec::new();
        }

        let world = camera.screen_to_world(screen);
        let wp = KPoint::new(world.x as f64, world.y as f64);

        // Controls of the selected node take priority over body hits.
        if let Some(sel) = self.selected
            && let Some(visual) = scene.visual(sel)
            && let Some(kind) = control_hit(visual, wp)
        {
            let action = match kind {
                ControlKind::AddChild => EngineAction::AddChild(sel),
                ControlKind::Elaborate => EngineAction::RequestElaboration(sel),
                ControlKind::Collapse => EngineAction::Collapse(sel),
                ControlKind::Expand => EngineAction::ExpandFocus(sel),
            };
            return vec![action];
        }

        match hit_test(scene, wp) {
            Some(id) => {
                self.selected = Some(id);
                vec![EngineAction::Select(id)]
            }
            None => {
                self.selected = None;
                vec![EngineAction::ClearSelection]
            }
        }
    }

    fn pointer_move(&mut self, screen: Point) -> Vec<EngineAction> {
        let Gesture::Panning { last } = self.gesture else {
            return Vec::new();
        };
        let dx = screen.x - last.x;
        let dy = screen.y - last.y;
        self.gesture = Gesture::Panning { last: screen };
        vec![
            EngineAction::Pan { dx, dy },
            EngineAction::RequestRender,
        ]
    }
}
