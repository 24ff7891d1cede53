// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for model storage.
//!
//! Each stored entity gets a type-safe key. Keys are dense indices into the
//! model's storage vectors; nothing is ever removed, so a key stays valid for
//! the lifetime of the model and survives a save/load round trip unchanged.

use serde::{Deserialize, Serialize};

/// Identifier of an assembly tree node.
pub type NodeId = u32;

macro_rules! model_key {
    ($($(#[$meta:meta])* $name:ident;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            pub struct $name(pub u32);

            impl $name {
                #[inline]
                pub fn index(self) -> usize {
                    self.0 as usize
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<u32> for $name {
                fn from(raw: u32) -> Self {
                    $name(raw)
                }
            }
        )+
    };
}

model_key! {
    /// Key for a mesh stored in the model.
    MeshKey;

    /// Key for a material stored in the model.
    MaterialKey;

    /// Key for a placement of a mesh.
    InstanceKey;

    /// Key under which a model is included (itself or another model).
    InclusionKey;
}

/// A mesh instance qualified by the inclusion it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceInc {
    pub inclusion: InclusionKey,
    pub instance: InstanceKey,
}

impl InstanceInc {
    pub fn new(inclusion: InclusionKey, instance: InstanceKey) -> Self {
        Self {
            inclusion,
            instance,
        }
    }
}
