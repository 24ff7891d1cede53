// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! scpatch geometry
//!
//! Typed channel assembly from flat patch payloads, the mesh model shared
//! with the scene store, and procedural face construction.

pub mod builder;
pub mod channels;
pub mod error;
pub mod face_builder;
pub mod mesh;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use builder::{ChannelIssue, Channels, MeshBuilder};
pub use channels::{Channel, Presence, Rgba};
pub use error::{Error, Result};
pub use face_builder::{add_planar_face, add_quad_face, build_box};
pub use mesh::{
    ElementChannels, ElementKind, Mesh, MeshChannels, MeshElement, SelectionBits, Winding,
};
