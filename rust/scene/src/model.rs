// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model storage: meshes, materials, instances and the default camera.
//!
//! The [`ModelStore`] trait is the contract the patch engine mutates through.
//! [`Model`] is the in-memory implementation persisted by [`crate::cache`].

use crate::assembly_tree::AssemblyTree;
use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::keys::{InclusionKey, InstanceKey, MaterialKey, MeshKey};
use scpatch_geometry::{Mesh, Rgba};
use serde::{Deserialize, Serialize};

/// Solid material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub diffuse_color: Rgba,
}

impl Material {
    pub fn solid(diffuse_color: Rgba) -> Self {
        Self { diffuse_color }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::solid(Rgba::WHITE)
    }
}

/// Per-instance material overrides for faces, lines and points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstanceMaterials {
    pub face: Option<MaterialKey>,
    pub line: Option<MaterialKey>,
    pub point: Option<MaterialKey>,
}

/// A placement of a mesh in the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub mesh: MeshKey,
    pub materials: InstanceMaterials,
}

/// Summary computed by [`Model::prepare_stream`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StreamInfo {
    pub mesh_count: usize,
    pub instance_count: usize,
    pub triangle_count: usize,
    /// Bounds over all instanced meshes, `None` when nothing has points.
    pub bounds: Option<([f32; 3], [f32; 3])>,
}

/// Mutations the patch engine performs on a model.
pub trait ModelStore {
    /// Model name as given when it was opened or created.
    fn name(&self) -> &str;

    /// Store a mesh. Ownership moves into the model.
    fn insert_mesh(&mut self, mesh: Mesh) -> MeshKey;

    fn insert_material(&mut self, material: Material) -> MaterialKey;

    /// Create a new instance of a stored mesh.
    fn instance(&mut self, mesh: MeshKey) -> Result<InstanceKey>;

    fn contains_instance(&self, instance: InstanceKey) -> bool;

    /// Replace the face/line/point material triple of an instance.
    fn set_instance_materials(
        &mut self,
        instance: InstanceKey,
        materials: InstanceMaterials,
    ) -> Result<()>;

    /// Replace the default camera wholesale.
    fn set_default_camera(&mut self, camera: Camera);

    /// Inclusion key of the model itself, created on first use.
    fn include_self(&mut self) -> InclusionKey;
}

/// In-memory model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Model {
    name: String,
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    instances: Vec<Instance>,
    /// Names of included models, indexed by [`InclusionKey`].
    inclusions: Vec<String>,
    default_camera: Option<Camera>,
    assembly: Option<AssemblyTree>,
    stream: Option<StreamInfo>,
}

impl Model {
    /// Create an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn mesh(&self, key: MeshKey) -> Option<&Mesh> {
        self.meshes.get(key.index())
    }

    pub fn material(&self, key: MaterialKey) -> Option<&Material> {
        self.materials.get(key.index())
    }

    pub fn instance_data(&self, key: InstanceKey) -> Option<&Instance> {
        self.instances.get(key.index())
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn default_camera(&self) -> Option<&Camera> {
        self.default_camera.as_ref()
    }

    /// Assembly tree last serialized into this model.
    pub fn assembly(&self) -> Option<&AssemblyTree> {
        self.assembly.as_ref()
    }

    pub(crate) fn set_assembly(&mut self, tree: AssemblyTree) {
        self.assembly = Some(tree);
        self.stream = None;
    }

    /// Include another model by name; including the same name twice returns the same key.
    pub fn include(&mut self, model_name: &str) -> InclusionKey {
        if let Some(pos) = self.inclusions.iter().position(|n| n == model_name) {
            return InclusionKey(pos as u32);
        }
        self.inclusions.push(model_name.to_string());
        InclusionKey((self.inclusions.len() - 1) as u32)
    }

    pub fn inclusion_name(&self, key: InclusionKey) -> Result<&str> {
        self.inclusions
            .get(key.index())
            .map(String::as_str)
            .ok_or(Error::InclusionNotFound(key))
    }

    /// Stream summary, present once [`Model::prepare_stream`] ran after the last edit.
    pub fn stream_info(&self) -> Option<&StreamInfo> {
        self.stream.as_ref()
    }

    /// Finalize the model for streaming: compute counts and bounds of instanced geometry.
    pub fn prepare_stream(&mut self) -> &StreamInfo {
        let mut bounds: Option<([f32; 3], [f32; 3])> = None;
        let mut triangle_count = 0;
        for instance in &self.instances {
            let Some(mesh) = self.meshes.get(instance.mesh.index()) else {
                continue;
            };
            triangle_count += mesh.triangle_count();
            if let Some((min, max)) = mesh.bounds() {
                let (lo, hi) = bounds.get_or_insert(([min.x, min.y, min.z], [max.x, max.y, max.z]));
                for axis in 0..3 {
                    lo[axis] = lo[axis].min(min[axis]);
                    hi[axis] = hi[axis].max(max[axis]);
                }
            }
        }

        let info = StreamInfo {
            mesh_count: self.meshes.len(),
            instance_count: self.instances.len(),
            triangle_count,
            bounds,
        };
        tracing::debug!(
            model = %self.name,
            meshes = info.mesh_count,
            instances = info.instance_count,
            triangles = info.triangle_count,
            "Prepared model stream"
        );
        self.stream.insert(info)
    }
}

impl ModelStore for Model {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert_mesh(&mut self, mesh: Mesh) -> MeshKey {
        self.meshes.push(mesh);
        self.stream = None;
        MeshKey((self.meshes.len() - 1) as u32)
    }

    fn insert_material(&mut self, material: Material) -> MaterialKey {
        self.materials.push(material);
        MaterialKey((self.materials.len() - 1) as u32)
    }

    fn instance(&mut self, mesh: MeshKey) -> Result<InstanceKey> {
        if self.meshes.get(mesh.index()).is_none() {
            return Err(Error::MeshNotFound(mesh));
        }
        self.instances.push(Instance {
            mesh,
            materials: InstanceMaterials::default(),
        });
        self.stream = None;
        Ok(InstanceKey((self.instances.len() - 1) as u32))
    }

    fn contains_instance(&self, instance: InstanceKey) -> bool {
        self.instances.get(instance.index()).is_some()
    }

    fn set_instance_materials(
        &mut self,
        instance: InstanceKey,
        materials: InstanceMaterials,
    ) -> Result<()> {
        for key in [materials.face, materials.line, materials.point]
            .into_iter()
            .flatten()
        {
            if self.materials.get(key.index()).is_none() {
                return Err(Error::MaterialNotFound(key));
            }
        }
        let target = self
            .instances
            .get_mut(instance.index())
            .ok_or(Error::InstanceNotFound(instance))?;
        target.materials = materials;
        Ok(())
    }

    fn set_default_camera(&mut self, camera: Camera) {
        self.default_camera = Some(camera);
    }

    fn include_self(&mut self) -> InclusionKey {
        let name = self.name.clone();
        self.include(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scpatch_geometry::{build_box, Point3};

    fn unit_box() -> Mesh {
        build_box(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            [Rgba::WHITE; 6],
        )
    }

    #[test]
    fn test_insert_and_instance() {
        let mut model = Model::new("sample");
        let mesh = model.insert_mesh(unit_box());
        let instance = model.instance(mesh).unwrap();
        assert_eq!(model.instance_data(instance).unwrap().mesh, mesh);
        assert_eq!(model.instance_count(), 1);
    }

    #[test]
    fn test_instance_of_missing_mesh_fails() {
        let mut model = Model::new("sample");
        assert!(matches!(
            model.instance(MeshKey(4)),
            Err(Error::MeshNotFound(MeshKey(4)))
        ));
    }

    #[test]
    fn test_instance_materials_are_replaced() {
        let mut model = Model::new("sample");
        let mesh = model.insert_mesh(unit_box());
        let instance = model.instance(mesh).unwrap();
        let red = model.insert_material(Material::solid(Rgba::new(1.0, 0.0, 0.0, 1.0)));
        let black = model.insert_material(Material::solid(Rgba::BLACK));

        let materials = InstanceMaterials {
            face: Some(red),
            line: Some(black),
            point: Some(black),
        };
        model.set_instance_materials(instance, materials).unwrap();
        assert_eq!(model.instance_data(instance).unwrap().materials, materials);

        let missing = model.set_instance_materials(InstanceKey(9), materials);
        assert!(matches!(missing, Err(Error::InstanceNotFound(_))));
    }

    #[test]
    fn test_self_inclusion_is_stable() {
        let mut model = Model::new("sample");
        let a = model.include_self();
        let b = model.include_self();
        assert_eq!(a, b);
        assert_eq!(model.inclusion_name(a).unwrap(), "sample");
    }

    #[test]
    fn test_prepare_stream_bounds() {
        let mut model = Model::new("sample");
        let mesh = model.insert_mesh(unit_box());
        model.instance(mesh).unwrap();
        let info = model.prepare_stream().clone();
        assert_eq!(info.instance_count, 1);
        assert_eq!(info.triangle_count, 12);
        assert_eq!(info.bounds, Some(([0.0, 0.0, 0.0], [1.0, 1.0, 1.0])));

        model.insert_mesh(unit_box());
        assert!(model.stream_info().is_none());
    }
}
