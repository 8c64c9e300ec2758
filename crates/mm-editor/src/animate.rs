//! Cooperative viewport animation for fit-to-view.
//!
//! One animation at a time: starting a new fit replaces the current one.
//! The host drives it frame by frame through the engine's `tick`; stopping
//! is just not sampling again.

use crate::camera::Camera;

/// Fixed fit duration.
pub const FIT_DURATION_MS: f64 = 400.0;

fn ease_in_out_cubic(p: f32) -> f32 {
    if p < 0.5 {
        4.0 * p * p * p
    } else {
        1.0 - (-2.0 * p + 2.0).powi(3) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitAnimation {
    start: Camera,
    target: Camera,
    start_ms: f64,
}

impl FitAnimation {
    pub fn new(start: Camera, target: Camera, now_ms: f64) -> Self {
        Self {
            start,
            target,
            start_ms: now_ms,
        }
    }

    pub fn target(&self) -> Camera {
        self.target
    }

    /// Camera state at `now_ms`, and whether the animation has finished.
    pub fn sample(&self, now_ms: f64) -> (Camera, bool) {
        let progress = ((now_ms - self.start_ms) / FIT_DURATION_MS).clamp(0.0, 1.0) as f32;
        let eased = ease_in_out_cubic(progress);
        let lerp = |a: f32, b: f32| a + (b - a) * eased;
        let camera = Camera {
            zoom: lerp(self.start.zoom, self.target.zoom),
            tx: lerp(self.start.tx, self.target.tx),
            ty: lerp(self.start.ty, self.target.ty),
        };
        (camera, progress >= 1.0)
    }
}
