// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `colors`: per-instance material overrides.
//!
//! Faces get a solid material of the record's color. Lines and points share
//! one black material, created the first time a record needs it.

use super::{decoded, SceneContext};
use crate::report::SectionReport;
use scpatch_core::{ColorRecord, ColorTarget, Decoded};
use scpatch_geometry::Rgba;
use scpatch_scene::{InstanceKey, InstanceMaterials, Material, MaterialKey};

pub fn apply(
    records: &[Decoded<ColorRecord>],
    ctx: &mut SceneContext<'_>,
    report: &mut SectionReport,
) {
    let mut edge_material: Option<MaterialKey> = None;

    for (index, record) in records.iter().enumerate() {
        let Some(record) = decoded(index, record, report) else {
            continue;
        };
        let instance = match &record.target {
            ColorTarget::Instance(id) => InstanceKey(*id),
            ColorTarget::Batch(ids) => {
                report.note(format!(
                    "record {index}: batch color for {} nodes not processed",
                    ids.len()
                ));
                continue;
            }
        };
        if !ctx.model.contains_instance(instance) {
            report.fail(index, record.node_id, format!("instance not found: {instance}"));
            continue;
        }

        let [r, g, b] = record.color;
        let face = ctx
            .model
            .insert_material(Material::solid(Rgba::opaque_255(r, g, b)));
        let edge = *edge_material
            .get_or_insert_with(|| ctx.model.insert_material(Material::solid(Rgba::BLACK)));
        let materials = InstanceMaterials {
            face: Some(face),
            line: Some(edge),
            point: Some(edge),
        };

        match ctx.model.set_instance_materials(instance, materials) {
            Ok(()) => {
                tracing::debug!(
                    node_id = ?record.node_id,
                    instance = %instance,
                    r, g, b,
                    "Applied instance color"
                );
                report.applied += 1;
            }
            Err(e) => report.fail(index, record.node_id, e.to_string()),
        }
    }
}
