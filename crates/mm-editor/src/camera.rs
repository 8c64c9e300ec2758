//! Viewport transform: uniform zoom plus translation.
//!
//! The camera is the affine `[zoom, 0, 0, zoom, tx, ty]` mapping world
//! coordinates to screen pixels. Zoom is clamped to a fixed band; focal
//! zoom compensates the translation so the point under the cursor stays
//! put on screen.

use mm_core::model::Point;

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 1.0;
/// Increment used by the explicit zoom buttons.
pub const ZOOM_STEP: f32 = 0.1;
/// Per-unit wheel sensitivity; zoom scales by `0.989^delta`.
pub const ZOOM_WHEEL_SENSITIVITY: f32 = 0.989;

/// Canvas size in screen pixels. Hosts without a measurable container yet
/// fall back to the default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub zoom: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }
}

impl Camera {
    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.tx, p.y * self.zoom + self.ty)
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new((p.x - self.tx) / self.zoom, (p.y - self.ty) / self.zoom)
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.tx += dx;
        self.ty += dy;
    }

    /// Set the zoom while keeping the world point under `screen` stationary.
    pub fn zoom_to_point(&mut self, screen: Point, zoom: f32) {
        let anchor = self.screen_to_world(screen);
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.tx = screen.x - anchor.x * self.zoom;
        self.ty = screen.y - anchor.y * self.zoom;
    }

    /// Wheel zoom: multiplicative sensitivity per delta unit, focal at the
    /// pointer.
    pub fn wheel_zoom(&mut self, screen: Point, delta: f32) {
        let target = self.zoom * ZOOM_WHEEL_SENSITIVITY.powf(delta);
        self.zoom_to_point(screen, target);
    }

    /// Step zoom around a world-space focal point (the zoom buttons). The
    /// focal point keeps its screen position.
    pub fn step_zoom(&mut self, focus: Point, step: f32) {
        let screen = self.world_to_screen(focus);
        let target = (self.zoom + step).clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom_to_point(screen, target);
    }

    /// Put a world point at the middle of the viewport.
    pub fn center_on(&mut self, world: Point, viewport: Viewport) {
        self.tx = viewport.width / 2.0 - world.x * self.zoom;
        self.ty = viewport.height / 2.0 - world.y * self.zoom;
    }

    /// The post-arrange framing: the root column hugs the left edge and the
    /// root sits slightly above the vertical middle.
    pub fn frame_root(&mut self, root_y: f32, viewport: Viewport) {
        self.tx = 100.0;
        self.ty = viewport.height / 2.0 - root_y * self.zoom - 50.0;
    }
}
