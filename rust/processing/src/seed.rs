// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Starter scene for a fresh artifact directory.
//!
//! | Node | Name              | Kind                       |
//! |------|-------------------|----------------------------|
//! | 0    | model name        | root                       |
//! | 1    | `Frame`           | assembly                   |
//! | 2    | `Housing`         | assembly                   |
//! | 3    | `Cover`           | assembly                   |
//! | 4    | `Housing body`    | body instance of a box     |
//!
//! The box is instance 0 of mesh 0, a 2 x 1 x 0.5 hexahedron with one color
//! per side.

use crate::baseline;
use crate::error::Result;
use crate::run::RunConfig;
use scpatch_geometry::{build_box, Point3, Rgba, Vector3};
use scpatch_scene::{
    AssemblyTree, AttributeType, Camera, InstanceInc, Model, ModelStore, Projection, SceneGraph,
    StreamInfo,
};

const SIDE_COLORS: [Rgba; 6] = [
    Rgba::new(0.8, 0.2, 0.2, 1.0),
    Rgba::new(0.2, 0.8, 0.2, 1.0),
    Rgba::new(0.2, 0.2, 0.8, 1.0),
    Rgba::new(0.8, 0.8, 0.2, 1.0),
    Rgba::new(0.8, 0.2, 0.8, 1.0),
    Rgba::new(0.2, 0.8, 0.8, 1.0),
];

/// Build the starter model and tree in memory.
pub fn seed_scene(model_name: &str) -> scpatch_scene::Result<(Model, AssemblyTree)> {
    let mut model = Model::new(model_name);
    let inclusion = model.include_self();
    let mesh = model.insert_mesh(build_box(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 1.0, 0.5),
        SIDE_COLORS,
    ));
    let instance = model.instance(mesh)?;
    model.set_default_camera(Camera {
        projection: Projection::Perspective,
        position: Point3::new(5.0, -5.0, 4.0),
        target: Point3::new(1.0, 0.5, 0.25),
        up_vector: Vector3::new(0.0, 0.0, 1.0),
        field_width: 3.0,
        field_height: 3.0,
    });

    let mut tree = AssemblyTree::new();
    let root = tree.create_root()?;
    tree.set_node_name(root, model_name)?;
    let mut housing = root;
    for name in ["Frame", "Housing", "Cover"] {
        let child = tree.create_child(root)?;
        tree.set_node_name(child, name)?;
        if name == "Housing" {
            housing = child;
        }
    }
    tree.add_attribute(housing, "Material", AttributeType::String, "Steel")?;
    let body = tree.create_body_instance(housing)?;
    tree.set_node_name(body, "Housing body")?;
    tree.set_body_instance_mesh_instance(body, InstanceInc::new(inclusion, instance))?;

    tree.serialize_to_model(&mut model)?;
    Ok((model, tree))
}

/// Write the starter scene, replacing any artifacts and baseline of the
/// same model.
pub fn init_scene(config: &RunConfig) -> Result<StreamInfo> {
    let set = config.artifacts();
    std::fs::create_dir_all(set.dir())?;
    let removed = baseline::discard(&set)?;
    if removed > 0 {
        tracing::info!(removed, "Discarded previous baseline");
    }

    let (mut model, tree) = seed_scene(&config.model_name)?;
    set.write_tree(&tree)?;
    set.write_model(&mut model)?;
    tracing::info!(
        dir = %set.dir().display(),
        model = %config.model_name,
        nodes = tree.len(),
        "Seed scene written"
    );
    Ok(model.stream_info().cloned().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scpatch_scene::NodeKind;

    #[test]
    fn test_seed_layout() {
        let (model, tree) = seed_scene("demo").unwrap();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.node(0).unwrap().name, "demo");
        assert_eq!(tree.node(2).unwrap().name, "Housing");
        assert!(tree.node(4).unwrap().is_body_instance());
        assert!(matches!(
            tree.node(4).unwrap().kind,
            NodeKind::BodyInstance { mesh_instance: Some(_) }
        ));
        assert_eq!(model.instance_count(), 1);
        assert_eq!(model.assembly(), Some(&tree));
    }
}
