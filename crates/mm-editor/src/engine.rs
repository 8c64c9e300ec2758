//! The engine facade: owns the map, the retained scene, the camera, and the
//! interaction controller, and keeps them consistent.
//!
//! Ordering discipline for every structural change: mutate the model, run
//! layout to completion, sync visuals, then route connectors, then reframe.
//! Rendering is requested only after all of that, so the host never draws
//! mid-recompute. Every structural mutation also flags the serialized state
//! as dirty for the host's debounced autosave.

use crate::animate::FitAnimation;
use crate::camera::{Camera, Viewport, MAX_ZOOM, ZOOM_STEP};
use crate::controller::{Controller, EngineAction};
use crate::input::InputEvent;
use crate::outline::{HostSignal, OutlineNode, OutlineSource};
use mm_core::doc::{export_document, import_document, ImportError, MapDocument};
use mm_core::layout::{compute_layout, LayoutConfig};
use mm_core::model::{MediaFile, MindMap, NodeSize, NodeUpdate, Point, TreeError};
use mm_core::{visibility, NodeId};
use mm_render::{route_connections, NodeVisual, Scene};

/// Horizontal offset for a freshly added child before layout places it.
const NEW_CHILD_OFFSET: f32 = 1000.0;
/// Padding around a fitted bounding box.
const FIT_PADDING: f32 = 50.0;

pub struct MindMapEngine {
    map: MindMap,
    scene: Scene,
    camera: Camera,
    controller: Controller,
    animation: Option<FitAnimation>,
    viewport: Viewport,
    layout: LayoutConfig,
    render_pending: bool,
    autosave_pending: bool,
}

impl MindMapEngine {
    /// Fresh session: one root node, framed after the first arrange.
    pub fn new(root_title: &str) -> Self {
        let mut map = MindMap::new();
        // The map is empty, so the root insert cannot fail.
        let _ = map.create_node(
            Point::new(150.0, 300.0),
            root_title,
            None,
            NodeSize::Large,
            None,
        );
        let mut engine = Self::with_map(map);
        engine.arrange();
        engine
    }

    fn with_map(map: MindMap) -> Self {
        Self {
            map,
            scene: Scene::new(),
            camera: Camera::default(),
            controller: Controller::new(),
            animation: None,
            viewport: Viewport::default(),
            layout: LayoutConfig {
                horizontal_spacing: 500.0,
                vertical_gap: 50.0,
                ..LayoutConfig::default()
            },
            render_pending: false,
            autosave_pending: false,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn map(&self) -> &MindMap {
        &self.map
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.controller.selected()
    }

    pub fn pan_mode(&self) -> bool {
        self.controller.pan_mode()
    }

    /// Debounced-save flag; reading clears it.
    pub fn take_autosave(&mut self) -> bool {
        std::mem::take(&mut self.autosave_pending)
    }

    /// Render-on-change flag; reading clears it.
    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.render_pending)
    }

    // ─── Layout ──────────────────────────────────────────────────────────

    /// Full layout pass: measure, position, sync visuals, route connectors,
    /// reframe on the primary root.
    pub fn arrange(&mut self) {
        self.sync_scene();
        self.scene.apply_visibility(&self.map);

        let heights = self.scene.measured_heights();
        let positions = compute_layout(
            &self.map,
            |id| heights.get(&id).copied(),
            &self.layout,
            self.viewport.height,
        );

        for (&id, &pos) in &positions {
            if let Some(node) = self.map.node_mut(id) {
                node.pos = pos;
            }
            self.scene.set_position(id, pos);
        }

        route_connections(&self.map, &mut self.scene);

        if let Some(&root) = self.map.roots().first()
            && let Some(node) = self.map.node(root)
        {
            self.camera.frame_root(node.pos.y, self.viewport);
        }

        self.render_pending = true;
        self.autosave_pending = true;
    }

    fn sync_scene(&mut self) {
        for node in self.map.iter() {
            self.scene.insert(NodeVisual::build(node));
        }
    }

    fn sync_visual(&mut self, id: NodeId) {
        if let Some(node) = self.map.node(id) {
            self.scene.insert(NodeVisual::build(node));
        }
    }

    // ─── Structural operations ───────────────────────────────────────────

    /// Create a child and rearrange. The returned id is also surfaced to the
    /// host for immediate editing when the add came from the on-canvas
    /// control.
    pub fn add_child(&mut self, parent: NodeId) -> Result<NodeId, TreeError> {
        let at = self
            .map
            .node(parent)
            .ok_or(TreeError::UnknownNode(parent))?
            .pos;
        let id = self.map.create_node(
            Point::new(at.x + NEW_CHILD_OFFSET, at.y),
            "Untitled Node",
            Some(parent),
            NodeSize::Medium,
            None,
        )?;
        self.arrange();
        Ok(id)
    }

    /// Delete a subtree. Root deletion is refused with the model unchanged;
    /// the host shows the refusal to the user.
    pub fn delete_node(&mut self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let removed = self.map.delete_node(id)?;
        for &gone in &removed {
            self.scene.remove(gone);
        }
        self.controller.prune_selection(&removed);
        self.arrange();
        Ok(removed)
    }

    pub fn delete_selection(&mut self) -> Result<Vec<NodeId>, TreeError> {
        match self.controller.selected() {
            Some(id) => self.delete_node(id),
            None => Ok(Vec::new()),
        }
    }

    /// Single-node collapse. No-op on leaves.
    pub fn collapse(&mut self, id: NodeId) {
        if visibility::collapse(&mut self.map, id) {
            self.sync_visual(id);
            self.arrange();
        }
    }

    /// The focus interaction behind the expand control: reveal this subtree,
    /// put every other sibling subtree away, then fit it into view.
    pub fn expand_and_focus(&mut self, id: NodeId, now_ms: f64) {
        visibility::collapse_other_siblings(&mut self.map, id);
        visibility::expand(&mut self.map, id);
        self.controller.clear_selection();
        self.arrange();
        self.fit_to_view(id, now_ms);
    }

    /// Animate the viewport to frame `id` and its visible descendants.
    /// A fit already in flight is simply replaced.
    pub fn fit_to_view(&mut self, id: NodeId, now_ms: f64) {
        let mut ids: Vec<NodeId> = self
            .map
            .subtree_ids(id)
            .into_iter()
            .filter(|&n| visibility::is_visible(&self.map, n))
            .collect();
        if !ids.contains(&id) {
            ids.push(id);
        }

        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        let mut any = false;
        for nid in ids {
            if let Some(v) = self.scene.visual(nid) {
                let b = v.bounds();
                min_x = min_x.min(b.x0 as f32);
                min_y = min_y.min(b.y0 as f32);
                max_x = max_x.max(b.x1 as f32);
                max_y = max_y.max(b.y1 as f32);
                any = true;
            }
        }
        if !any {
            return;
        }

        let width = max_x - min_x;
        let height = max_y - min_y;
        let zoom_x = self.viewport.width / (width + FIT_PADDING * 2.0);
        let zoom_y = self.viewport.height / (height + FIT_PADDING * 2.0);
        let zoom = zoom_x.min(zoom_y).min(MAX_ZOOM);

        let center_x = min_x + width / 2.0;
        let center_y = min_y + height / 2.0;
        let target = Camera {
            zoom,
            tx: self.viewport.width / 2.0 - center_x * zoom,
            ty: self.viewport.height / 2.0 - center_y * zoom,
        };
        self.animation = Some(FitAnimation::new(self.camera, target, now_ms));
        self.render_pending = true;
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed one normalized input event through the controller and execute
    /// the resulting actions. Returned signals are requests the host must
    /// service (dialogs, AI calls).
    pub fn handle_input(&mut self, event: InputEvent, now_ms: f64) -> Vec<HostSignal> {
        let actions = self.controller.handle(event, &self.scene, &self.camera);
        let mut signals = Vec::new();

        for action in actions {
            match action {
                EngineAction::Pan { dx, dy } => {
                    self.camera.pan_by(dx, dy);
                }
                EngineAction::WheelZoom { at, delta } => {
                    self.camera.wheel_zoom(at, delta);
                    self.render_pending = true;
                }
                EngineAction::Select(_) | EngineAction::ClearSelection => {
                    self.render_pending = true;
                }
                EngineAction::AddChild(parent) => {
                    match self.add_child(parent) {
                        Ok(child) => signals.push(HostSignal::OpenNodeDetails(child)),
                        Err(err) => log::warn!("add child failed: {err}"),
                    }
                }
                EngineAction::Collapse(id) => self.collapse(id),
                EngineAction::ExpandFocus(id) => self.expand_and_focus(id, now_ms),
                EngineAction::OpenDetails(id) => {
                    signals.push(HostSignal::OpenNodeDetails(id));
                }
                EngineAction::RequestElaboration(id) => {
                    signals.push(HostSignal::ElaborationRequested {
                        id,
                        context: self.ancestry_path(id),
                    });
                }
                EngineAction::RequestRender => {
                    self.render_pending = true;
                }
            }
        }
        signals
    }

    /// Titles from the root down to `id`, joined for the AI prompt.
    pub fn ancestry_path(&self, id: NodeId) -> String {
        let mut titles = Vec::new();
        let mut cur = Some(id);
        while let Some(nid) = cur {
            let Some(node) = self.map.node(nid) else {
                break;
            };
            titles.push(node.title.clone());
            cur = node.parent;
        }
        titles.reverse();
        titles.join(" > ")
    }

    // ─── Node content ────────────────────────────────────────────────────

    /// Re-apply edited details from the node dialog. Rebuilds that single
    /// visual instead of running a full layout.
    pub fn apply_update(&mut self, id: NodeId, update: NodeUpdate) -> Result<(), TreeError> {
        self.map.apply_update(id, update)?;
        self.sync_visual(id);
        route_connections(&self.map, &mut self.scene);
        self.render_pending = true;
        self.autosave_pending = true;
        Ok(())
    }

    /// Completion of one asynchronous attachment decode.
    pub fn attach_media(&mut self, id: NodeId, media: MediaFile) -> Result<(), TreeError> {
        self.map.add_media(id, media)?;
        self.autosave_pending = true;
        Ok(())
    }

    /// Store free-form elaboration text from the AI collaborator.
    pub fn apply_elaboration(&mut self, id: NodeId, text: &str) -> Result<(), TreeError> {
        self.map.apply_update(
            id,
            NodeUpdate {
                ai_summary: Some(text.to_string()),
                ..Default::default()
            },
        )?;
        self.autosave_pending = true;
        Ok(())
    }

    /// Batch-create a child subtree from the AI collaborator's outline.
    /// The target node's notes absorb the outline's top-level description
    /// and sources; each nested entry becomes a node.
    pub fn create_subtree_from_outline(
        &mut self,
        parent: NodeId,
        outline: &OutlineNode,
    ) -> Result<(), TreeError> {
        {
            let node = self.map.node_mut(parent).ok_or(TreeError::UnknownNode(parent))?;
            let addition = notes_for(&outline.description, &outline.sources);
            if !addition.is_empty() {
                if node.notes.is_empty() {
                    node.notes = addition;
                } else {
                    node.notes = format!("{}\n\n{}", node.notes, addition);
                }
            }
        }
        self.create_outline_children(parent, &outline.children)?;
        self.arrange();
        Ok(())
    }

    fn create_outline_children(
        &mut self,
        parent: NodeId,
        children: &[OutlineNode],
    ) -> Result<(), TreeError> {
        for entry in children {
            let at = self
                .map
                .node(parent)
                .ok_or(TreeError::UnknownNode(parent))?
                .pos;
            let id = self.map.create_node(
                Point::new(at.x + 200.0, at.y),
                &entry.header,
                Some(parent),
                NodeSize::Medium,
                None,
            )?;
            if let Some(node) = self.map.node_mut(id) {
                node.notes = notes_for(&entry.description, &entry.sources);
            }
            self.create_outline_children(id, &entry.children)?;
        }
        Ok(())
    }

    /// Manual drag of one node: move the model and visual together and
    /// re-route, without a layout pass.
    pub fn move_node(&mut self, id: NodeId, pos: Point) -> Result<(), TreeError> {
        let node = self.map.node_mut(id).ok_or(TreeError::UnknownNode(id))?;
        node.pos = pos;
        self.scene.set_position(id, pos);
        route_connections(&self.map, &mut self.scene);
        self.render_pending = true;
        self.autosave_pending = true;
        Ok(())
    }

    // ─── Documents ───────────────────────────────────────────────────────

    pub fn export_json(&self) -> Result<String, ImportError> {
        export_document(&self.map).to_json()
    }

    /// The autosave accessor: current serialized state on demand.
    pub fn serialized_document(&self) -> Result<String, ImportError> {
        self.export_json()
    }

    /// Replace the session with a document. The previous tree is kept until
    /// the document parses; only then is the scene cleared and rebuilt.
    pub fn import_json(&mut self, json: &str) -> Result<(), ImportError> {
        let doc = MapDocument::from_json(json)?;
        self.map = import_document(&doc);
        self.scene.clear();
        self.controller.clear_selection();
        self.animation = None;
        self.arrange();
        Ok(())
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn toggle_pan_mode(&mut self, enabled: bool) {
        self.controller.set_pan_mode(enabled);
    }

    pub fn resize_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Viewport { width, height };
        self.render_pending = true;
    }

    pub fn zoom_in(&mut self) {
        let focus = self.zoom_focus();
        self.camera.step_zoom(focus, ZOOM_STEP);
        self.render_pending = true;
    }

    pub fn zoom_out(&mut self) {
        let focus = self.zoom_focus();
        self.camera.step_zoom(focus, -ZOOM_STEP);
        self.render_pending = true;
    }

    /// Zoom buttons anchor on the selection, else the primary root, else
    /// whatever world point is mid-viewport.
    fn zoom_focus(&self) -> Point {
        if let Some(sel) = self.controller.selected()
            && let Some(node) = self.map.node(sel)
        {
            return node.pos;
        }
        if let Some(&root) = self.map.roots().first()
            && let Some(node) = self.map.node(root)
        {
            return node.pos;
        }
        self.camera.screen_to_world(Point::new(
            self.viewport.width / 2.0,
            self.viewport.height / 2.0,
        ))
    }

    /// One frame of the cooperative animation loop. Returns whether an
    /// animation is still running (the host keeps scheduling frames while
    /// true).
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(animation) = self.animation else {
            return false;
        };
        let (camera, done) = animation.sample(now_ms);
        self.camera = camera;
        self.render_pending = true;
        if done {
            self.animation = None;
        }
        !done
    }
}

fn notes_for(description: &str, sources: &[OutlineSource]) -> String {
    let mut notes = description.to_string();
    if !sources.is_empty() {
        let listed: Vec<String> = sources
            .iter()
            .map(|s| format!("{}: {}", s.name, s.link))
            .collect();
        if !notes.is_empty() {
            notes.push_str("\n\n");
        }
        notes.push_str("Sources:\n");
        notes.push_str(&listed.join("\n"));
    }
    notes
}
