pub mod animate;
pub mod camera;
pub mod controller;
pub mod engine;
pub mod input;
pub mod outline;

pub use animate::{FIT_DURATION_MS, FitAnimation};
pub use camera::{Camera, MAX_ZOOM, MIN_ZOOM, Viewport, ZOOM_STEP, ZOOM_WHEEL_SENSITIVITY};
pub use controller::{Controller, EngineAction, Gesture};
pub use engine::MindMapEngine;
pub use input::{InputEvent, Modifiers};
pub use outline::{HostSignal, OutlineNode, OutlineSource};
