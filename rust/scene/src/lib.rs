// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # scpatch scene store
//!
//! The two collaborators a patch is applied to:
//!
//! - [`Model`]: meshes, materials, instances and the default camera, behind
//!   the [`ModelStore`] trait.
//! - [`AssemblyTree`]: the named node hierarchy with attributes and body
//!   instances, behind the [`SceneGraph`] trait.
//!
//! [`ArtifactSet`] opens and writes both as `.scs`, `.scz` and `.xml` files.

pub mod assembly_tree;
pub mod cache;
pub mod camera;
pub mod error;
pub mod keys;
pub mod model;
mod xml;

pub use assembly_tree::{AssemblyTree, Attribute, AttributeType, Node, NodeKind, SceneGraph};
pub use cache::{ArtifactKind, ArtifactSet, SIDECAR_SUFFIX};
pub use camera::{Camera, Projection};
pub use error::{Error, Result};
pub use keys::{InclusionKey, InstanceInc, InstanceKey, MaterialKey, MeshKey, NodeId};
pub use model::{Instance, InstanceMaterials, Material, Model, ModelStore, StreamInfo};
