// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene mutation handlers, one per section kind.
//!
//! Every handler walks its records in order, applies the valid ones and
//! records a [`crate::MutationFailure`] for the rest. All mutations are
//! overwrites, so a later record for the same target wins.

pub mod attributes;
pub mod camera;
pub mod colors;
pub mod meshes;
pub mod node_names;

use crate::report::SectionReport;
use scpatch_core::Decoded;
use scpatch_scene::{ModelStore, SceneGraph};

/// The two collaborators a patch mutates.
pub struct SceneContext<'a> {
    pub tree: &'a mut dyn SceneGraph,
    pub model: &'a mut dyn ModelStore,
}

impl<'a> SceneContext<'a> {
    pub fn new(tree: &'a mut dyn SceneGraph, model: &'a mut dyn ModelStore) -> Self {
        Self { tree, model }
    }
}

/// The decoded record, or `None` after recording why it could not be decoded.
pub(crate) fn decoded<'r, T>(
    index: usize,
    record: &'r Decoded<T>,
    report: &mut SectionReport,
) -> Option<&'r T> {
    match record {
        Ok(record) => Some(record),
        Err(e) => {
            report.fail(index, None, e.to_string());
            None
        }
    }
}
