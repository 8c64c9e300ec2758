//! Integration tests: build a tree → lay it out → verify the geometric
//! invariants hold across the whole position map.

use mm_core::id::NodeId;
use mm_core::layout::{LayoutConfig, compute_layout};
use mm_core::model::{MindMap, NodeSize, Point};
use mm_core::visibility;
use std::collections::HashMap;

const CANVAS_HEIGHT: f32 = 600.0;
const NODE_HEIGHT: f32 = 60.0;

fn heights(_: NodeId) -> Option<f32> {
    Some(NODE_HEIGHT)
}

fn child(map: &mut MindMap, parent: NodeId, title: &str) -> NodeId {
    map.create_node(Point::default(), title, Some(parent), NodeSize::Medium, None)
        .unwrap()
}

/// A three-level tree with uneven branching, enough to make naive layouts
/// collide at depth 2.
fn bushy_tree() -> (MindMap, NodeId) {
    let mut map = MindMap::new();
    let root = map
        .create_node(Point::default(), "root", None, NodeSize::Medium, None)
        .unwrap();
    for i in 0..3 {
        let mid = child(&mut map, root, &format!("branch {i}"));
        for j in 0..(i + 2) {
            let leaf = child(&mut map, mid, &format!("leaf {i}.{j}"));
            if i == 2 {
                child(&mut map, leaf, &format!("deep {i}.{j}"));
            }
        }
    }
    (map, root)
}

// ─── No-overlap invariant ────────────────────────────────────────────────

#[test]
fn no_two_visible_nodes_overlap_within_a_depth_column() {
    let (map, _) = bushy_tree();
    let cfg = LayoutConfig::default();
    let pos = compute_layout(&map, heights, &cfg, CANVAS_HEIGHT);

    let mut columns: HashMap<i64, Vec<f32>> = HashMap::new();
    for p in pos.values() {
        columns.entry(p.x.round() as i64).or_default().push(p.y);
    }
    for (col, ys) in columns.iter_mut() {
        ys.sort_by(|a, b| a.total_cmp(b));
        for pair in ys.windows(2) {
            let top_bottom = pair[0] + NODE_HEIGHT / 2.0;
            let bottom_top = pair[1] - NODE_HEIGHT / 2.0;
            assert!(
                bottom_top >= top_bottom,
                "vertical spans overlap in column {col}: {pair:?}"
            );
        }
    }
}

// ─── Centering invariant ─────────────────────────────────────────────────

#[test]
fn every_unclamped_parent_sits_on_its_childrens_midpoint() {
    let (map, _) = bushy_tree();
    let pos = compute_layout(&map, heights, &LayoutConfig::default(), CANVAS_HEIGHT);

    for node in map.iter() {
        let children: Vec<NodeId> = map
            .children(node.id)
            .iter()
            .copied()
            .filter(|c| pos.contains_key(c))
            .collect();
        if children.is_empty() {
            continue;
        }
        let first = pos[&children[0]].y;
        let last = pos[children.last().unwrap()].y;
        let midpoint = (first + last) / 2.0;
        // The clamp may only push a parent below the midpoint, never above.
        assert!(
            pos[&node.id].y >= midpoint - 1e-3,
            "parent {} above its children's midpoint",
            node.id
        );
    }
}

// ─── Collapse propagation ────────────────────────────────────────────────

#[test]
fn collapsing_id_two_removes_its_child_from_the_position_map() {
    // root(0), children 1 and 2, 2 has child 3
    let mut map = MindMap::new();
    let root = map
        .create_node(Point::default(), "root", None, NodeSize::Medium, None)
        .unwrap();
    let one = child(&mut map, root, "one");
    let two = child(&mut map, root, "two");
    let three = child(&mut map, two, "three");

    visibility::collapse(&mut map, two);
    let cfg = LayoutConfig::default();
    let pos = compute_layout(&map, heights, &cfg, CANVAS_HEIGHT);

    assert!(pos.contains_key(&root));
    assert!(pos.contains_key(&one));
    assert!(pos.contains_key(&two));
    assert!(!pos.contains_key(&three), "hidden descendant was placed");

    // id 1 is positioned without regard to id 3's former space: the two
    // siblings pack tightly, one gap apart.
    let spacing = pos[&two].y - pos[&one].y;
    assert!((spacing - (NODE_HEIGHT + cfg.vertical_gap)).abs() < 1e-3);
}

#[test]
fn expanding_restores_the_full_position_map() {
    let (mut map, root) = bushy_tree();
    let first_branch = map.children(root)[0];

    let full = compute_layout(&map, heights, &LayoutConfig::default(), CANVAS_HEIGHT);
    visibility::collapse(&mut map, first_branch);
    let reduced = compute_layout(&map, heights, &LayoutConfig::default(), CANVAS_HEIGHT);
    visibility::expand(&mut map, first_branch);
    let restored = compute_layout(&map, heights, &LayoutConfig::default(), CANVAS_HEIGHT);

    assert!(reduced.len() < full.len());
    assert_eq!(restored.len(), full.len());
    for (id, p) in &full {
        assert_eq!(restored[id], *p, "node {id} moved after collapse/expand cycle");
    }
}

// ─── Deletion cascade ────────────────────────────────────────────────────

#[test]
fn deletion_removes_the_subtree_and_every_touching_connection() {
    let (mut map, root) = bushy_tree();
    let victim = map.children(root)[2];
    let doomed = map.subtree_ids(victim);

    let removed = map.delete_node(victim).unwrap();
    assert_eq!(removed.len(), doomed.len());

    for id in &doomed {
        assert!(!map.contains(*id));
        for conn in map.connections() {
            assert_ne!(conn.from, *id);
            assert_ne!(conn.to, *id);
        }
    }
    // No surviving node references a removed child
    for node in map.iter() {
        for c in map.children(node.id) {
            assert!(map.contains(*c), "dangling child reference on {}", node.id);
        }
    }
    // And layout still works on the survivor
    let pos = compute_layout(&map, heights, &LayoutConfig::default(), CANVAS_HEIGHT);
    assert_eq!(pos.len(), map.len());
}
