// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use scpatch_geometry::{build_box, Point3, Rgba};
use scpatch_scene::{
    ArtifactKind, ArtifactSet, AssemblyTree, AttributeType, InstanceInc, Model, ModelStore,
    SceneGraph,
};
use std::fs;

fn populated() -> (Model, AssemblyTree) {
    let mut model = Model::new("widget");
    let inclusion = model.include_self();
    let mesh = model.insert_mesh(build_box(
        Point3::new(-1.0, -1.0, -1.0),
        Point3::new(1.0, 1.0, 1.0),
        [Rgba::WHITE; 6],
    ));
    let instance = model.instance(mesh).unwrap();

    let mut tree = AssemblyTree::with_root("widget");
    let part = tree.create_child(0).unwrap();
    tree.set_node_name(part, "housing").unwrap();
    tree.add_attribute(part, "Material", AttributeType::String, "Steel")
        .unwrap();
    let body = tree.create_body_instance(part).unwrap();
    tree.set_body_instance_mesh_instance(body, InstanceInc::new(inclusion, instance))
        .unwrap();
    tree.serialize_to_model(&mut model).unwrap();
    (model, tree)
}

#[test]
fn write_then_open_restores_model_and_tree() {
    let dir = tempfile::tempdir().unwrap();
    let set = ArtifactSet::new(dir.path(), "widget");
    let (mut model, tree) = populated();

    set.write_tree(&tree).unwrap();
    set.write_model(&mut model).unwrap();

    for kind in ArtifactKind::ALL {
        assert!(set.path(kind).is_file(), "{kind} missing");
    }

    let reopened = set.open_model().unwrap();
    assert_eq!(reopened, model);
    assert_eq!(reopened.stream_info().unwrap().triangle_count, 12);
    assert_eq!(set.open_tree(&reopened).unwrap(), tree);
}

#[test]
fn open_falls_back_to_compact_stream_then_model_tree() {
    let dir = tempfile::tempdir().unwrap();
    let set = ArtifactSet::new(dir.path(), "widget");
    let (mut model, tree) = populated();
    set.write_model(&mut model).unwrap();
    fs::remove_file(set.path(ArtifactKind::Bundle)).unwrap();

    let reopened = set.open_model().unwrap();
    assert_eq!(reopened.instance_count(), 1);
    // No XML on disk: the tree comes from the model.
    assert_eq!(set.open_tree(&reopened).unwrap(), tree);
}

#[test]
fn open_without_artifacts_creates_empty_scene() {
    let dir = tempfile::tempdir().unwrap();
    let set = ArtifactSet::new(dir.path(), "fresh");

    let model = set.open_model().unwrap();
    assert_eq!(model.name(), "fresh");
    assert_eq!(model.mesh_count(), 0);

    let tree = set.open_tree(&model).unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.node(0).unwrap().name, "fresh");
}

#[test]
fn rewriting_unchanged_scene_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let set = ArtifactSet::new(dir.path(), "widget");
    let (mut model, tree) = populated();

    set.write_tree(&tree).unwrap();
    set.write_model(&mut model).unwrap();
    let first: Vec<Vec<u8>> = ArtifactKind::ALL
        .iter()
        .map(|k| fs::read(set.path(*k)).unwrap())
        .collect();

    let mut reopened = set.open_model().unwrap();
    let tree = set.open_tree(&reopened).unwrap();
    set.write_tree(&tree).unwrap();
    set.write_model(&mut reopened).unwrap();
    let second: Vec<Vec<u8>> = ArtifactKind::ALL
        .iter()
        .map(|k| fs::read(set.path(*k)).unwrap())
        .collect();

    assert_eq!(first, second);
}
