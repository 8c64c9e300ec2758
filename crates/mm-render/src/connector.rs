//! Curved connector geometry between parent and child boxes.
//!
//! Control points sit a capped fraction of the horizontal distance out from
//! each endpoint, giving a shallow S-curve between depth columns. The paths
//! built here are render-surface objects only; the logical edge list lives
//! in the model and survives visibility changes untouched.

use crate::scene::Scene;
use kurbo::{CubicBez, Point as KPoint};
use mm_core::model::MindMap;
use mm_core::{visibility, NodeId};

/// Connector stroke width.
pub const CONNECTOR_WIDTH: f32 = 3.0;
/// Cap on the horizontal control-point offset.
const MAX_CONTROL_OFFSET: f64 = 100.0;

/// One routed connector on the render surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorPath {
    pub from: NodeId,
    pub to: NodeId,
    pub curve: CubicBez,
    /// The originating node's accent color.
    pub color: peniko::Color,
    pub width: f32,
}

/// Cubic between two box centers. The offset is `|dx| * 0.3` capped at
/// [`MAX_CONTROL_OFFSET`], so short hops stay gentle and long hops don't
/// balloon.
pub fn connector_curve(from: KPoint, to: KPoint) -> CubicBez {
    let dx = to.x - from.x;
    let offset = (dx.abs() * 0.3).min(MAX_CONTROL_OFFSET);
    CubicBez::new(
        from,
        KPoint::new(from.x + offset, from.y),
        KPoint::new(to.x - offset, to.y),
        to,
    )
}

/// Rebuild the render surface's connector set from the logical connection
/// list: exactly the edges whose two endpoints are both visible get a path,
/// positioned from the current visuals. Everything else is dropped from the
/// surface (and nothing else is touched).
pub fn route_connections(map: &MindMap, scene: &mut Scene) {
    let mut routed = Vec::with_capacity(map.connections().len());
    for conn in map.connections() {
        if !visibility::is_visible(map, conn.from) || !visibility::is_visible(map, conn.to) {
            continue;
        }
        let (Some(from), Some(to)) = (scene.visual(conn.from), scene.visual(conn.to)) else {
            continue;
        };
        let curve = connector_curve(
            KPoint::new(from.pos.x as f64, from.pos.y as f64),
            KPoint::new(to.pos.x as f64, to.pos.y as f64),
        );
        routed.push(ConnectorPath {
            from: conn.from,
            to: conn.to,
            curve,
            color: from.accent,
            width: CONNECTOR_WIDTH,
        });
    }
    log::trace!("routed {} of {} connections", routed.len(), map.connections().len());
    scene.set_connectors(routed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::NodeVisual;
    use mm_core::model::{NodeSize, Point};
    use pretty_assertions::assert_eq;

    #[test]
    fn control_points_offset_a_fraction_of_dx() {
        let c = connector_curve(KPoint::new(0.0, 0.0), KPoint::new(200.0, 100.0));
        assert_eq!(c.p1, KPoint::new(60.0, 0.0));
        assert_eq!(c.p2, KPoint::new(140.0, 100.0));
    }

    #[test]
    fn control_offset_is_capped() {
        let c = connector_curve(KPoint::new(0.0, 0.0), KPoint::new(1000.0, 0.0));
        assert_eq!(c.p1.x, 100.0);
        assert_eq!(c.p2.x, 900.0);
    }

    #[test]
    fn leftward_edges_curve_back_symmetrically() {
        let c = connector_curve(KPoint::new(200.0, 0.0), KPoint::new(0.0, 50.0));
        assert_eq!(c.p1, KPoint::new(260.0, 0.0));
        assert_eq!(c.p2, KPoint::new(-60.0, 50.0));
    }

    #[test]
    fn hidden_endpoints_drop_the_path_but_not_the_edge() {
        let mut map = MindMap::new();
        let root = map
            .create_node(Point::new(0.0, 0.0), "r", None, NodeSize::Medium, None)
            .unwrap();
        let a = map
            .create_node(Point::new(300.0, 0.0), "a", Some(root), NodeSize::Medium, None)
            .unwrap();
        let a1 = map
            .create_node(Point::new(600.0, 0.0), "a1", Some(a), NodeSize::Medium, None)
            .unwrap();

        let mut scene = Scene::new();
        for node in map.iter() {
            scene.insert(NodeVisual::build(node));
        }

        route_connections(&map, &mut scene);
        assert_eq!(scene.connectors().len(), 2);

        visibility::collapse(&mut map, a);
        route_connections(&map, &mut scene);
        let remaining = scene.connectors();
        assert_eq!(remaining.len(), 1);
        assert_eq!((remaining[0].from, remaining[0].to), (root, a));
        assert!(!remaining.iter().any(|p| p.to == a1));
        // Logical list is untouched
        assert_eq!(map.connections().len(), 2);
    }
}
