pub mod connector;
pub mod hit;
pub mod scene;
pub mod visual;

pub use connector::{ConnectorPath, connector_curve, route_connections};
pub use hit::{control_hit, hit_test};
pub use scene::Scene;
pub use visual::{ControlKind, Controls, NodeVisual, canvas_background, to_peniko, wrap_label};
