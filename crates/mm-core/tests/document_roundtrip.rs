//! Integration tests: export → import → export and the tolerant-import
//! behaviors around damaged documents.

use mm_core::doc::{ConnectionRecord, MapDocument, export_document, import_document};
use mm_core::id::NodeId;
use mm_core::model::{MediaFile, MindMap, NodeSize, NodeUpdate, Point};
use mm_core::visibility;
use pretty_assertions::assert_eq;

fn populated_map() -> MindMap {
    let mut map = MindMap::new();
    let root = map
        .create_node(Point::new(150.0, 300.0), "Project", None, NodeSize::Medium, None)
        .unwrap();
    let research = map
        .create_node(Point::new(450.0, 220.0), "Research", Some(root), NodeSize::Medium, None)
        .unwrap();
    let build = map
        .create_node(Point::new(450.0, 380.0), "Build", Some(root), NodeSize::Large, None)
        .unwrap();
    map.create_node(Point::new(750.0, 200.0), "Papers", Some(research), NodeSize::Small, None)
        .unwrap();
    map.create_node(Point::new(750.0, 260.0), "Interviews", Some(research), NodeSize::Small, None)
        .unwrap();

    map.apply_update(
        research,
        NodeUpdate {
            notes: Some("survey existing tools".into()),
            ai_summary: Some("Three competing approaches dominate.".into()),
            ..Default::default()
        },
    )
    .unwrap();
    map.add_media(
        build,
        MediaFile {
            name: "sketch.png".into(),
            data: "data:image/png;base64,AAAA".into(),
            mime: "image/png".into(),
        },
    )
    .unwrap();
    visibility::collapse(&mut map, research);
    map
}

#[test]
fn export_import_export_is_a_fixed_point() {
    let original = populated_map();
    let first = export_document(&original);
    let rebuilt = import_document(&first);
    let second = export_document(&rebuilt);
    assert_eq!(first, second);
}

#[test]
fn import_reproduces_an_isomorphic_tree() {
    let original = populated_map();
    let rebuilt = import_document(&export_document(&original));

    assert_eq!(rebuilt.len(), original.len());
    for node in original.iter() {
        let copy = rebuilt.node(node.id).expect("missing node after import");
        assert_eq!(copy.parent, node.parent);
        assert_eq!(copy.children, node.children);
        assert_eq!(copy.title, node.title);
        assert_eq!(copy.notes, node.notes);
        assert_eq!(copy.media, node.media);
        assert_eq!(copy.ai_summary, node.ai_summary);
        assert_eq!(copy.collapsed, node.collapsed);
        assert_eq!(copy.pos, node.pos);
    }
    assert_eq!(rebuilt.connections(), original.connections());
    assert_eq!(rebuilt.id_counter(), original.id_counter());
}

#[test]
fn json_roundtrip_through_text() {
    let doc = export_document(&populated_map());
    let json = doc.to_json().unwrap();
    let parsed = MapDocument::from_json(&json).unwrap();
    assert_eq!(parsed, doc);
}

#[test]
fn dangling_connection_record_is_dropped_not_fatal() {
    let mut doc = export_document(&populated_map());
    doc.connections.push(ConnectionRecord {
        from: NodeId::from_raw(5),
        to: NodeId::from_raw(6),
    });
    let before = doc.connections.len();

    let map = import_document(&doc);
    assert_eq!(map.len(), 5);
    assert_eq!(map.connections().len(), before - 1);
}

#[test]
fn counter_lower_than_max_id_never_reissues_ids() {
    let mut doc = export_document(&populated_map());
    doc.node_id_counter = 0;
    let mut map = import_document(&doc);

    let max_existing = map.iter().map(|n| n.id.raw()).max().unwrap();
    let fresh = map
        .create_node(Point::default(), "later", Some(NodeId::ROOT), NodeSize::Medium, None)
        .unwrap();
    assert!(fresh.raw() > max_existing);
}

#[test]
fn legacy_document_with_sparse_records_still_imports() {
    let json = r#"{
        "nodes": [
            {"id": 0, "x": 100, "y": 200, "parentId": null},
            {"id": 1, "x": 400, "y": 200, "parentId": 0, "size": "small"}
        ],
        "connections": [{"from": 0, "to": 1}]
    }"#;
    let doc = MapDocument::from_json(json).unwrap();
    let map = import_document(&doc);

    assert_eq!(map.len(), 2);
    let root = map.node(NodeId::ROOT).unwrap();
    assert_eq!(root.title, "Node");
    assert_eq!(map.children(NodeId::ROOT), &[NodeId::from_raw(1)]);
    assert_eq!(map.id_counter(), 2);
}
