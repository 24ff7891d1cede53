// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `meshes`: build geometry from channel data and attach it to the tree.
//!
//! Each record becomes one mesh, one instance of it, and two new nodes under
//! `parentNodeId`: an assembly child carrying the record's `nodeId` as its
//! generic id, and a body instance below it bound to the mesh instance.

use super::{decoded, SceneContext};
use crate::report::SectionReport;
use scpatch_core::{ChannelSet, Decoded, MeshRecord};
use scpatch_geometry::{Channels, ElementKind, Mesh, MeshBuilder};
use scpatch_scene::{InstanceInc, NodeId};

fn channels(set: &ChannelSet) -> Channels<'_> {
    Channels {
        position: &set.position,
        normal: set.normal.as_deref(),
        rgba: set.rgba.as_deref(),
        uv: set.uv.as_deref(),
    }
}

/// Assemble the mesh described by one record.
pub fn build_mesh(
    record: &MeshRecord,
    notes: &mut Vec<String>,
) -> Result<Mesh, scpatch_geometry::Error> {
    let mut builder = MeshBuilder::new();
    for (kind, set) in [
        (ElementKind::Face, &record.faces),
        (ElementKind::Line, &record.lines),
        (ElementKind::Point, &record.points),
    ] {
        if let Some(set) = set {
            builder.add(kind, channels(set));
        }
    }
    builder
        .winding(record.winding)
        .two_sided(record.is_two_sided)
        .manifold(record.is_manifold);

    notes.extend(builder.issues().iter().map(ToString::to_string));
    builder.finish()
}

pub fn apply(
    records: &[Decoded<MeshRecord>],
    ctx: &mut SceneContext<'_>,
    report: &mut SectionReport,
) {
    for (index, record) in records.iter().enumerate() {
        let Some(record) = decoded(index, record, report) else {
            continue;
        };
        let node_id = record.node_id;
        if !ctx.tree.contains(record.parent_node_id) {
            report.fail(
                index,
                Some(node_id),
                format!("parent node not found: {}", record.parent_node_id),
            );
            continue;
        }

        let mut issues = Vec::new();
        let mesh = build_mesh(record, &mut issues);
        for issue in issues {
            report.note(format!("record {index}: {issue}"));
        }
        let mesh = match mesh {
            Ok(mesh) => mesh,
            Err(e) => {
                report.fail(index, Some(node_id), e.to_string());
                continue;
            }
        };

        let triangles = mesh.triangle_count();
        let points = mesh.point_count();
        match attach(ctx, record, mesh) {
            Ok(child) => {
                tracing::debug!(
                    node_id,
                    parent = record.parent_node_id,
                    child,
                    triangles,
                    points,
                    "Injected mesh"
                );
                report.applied += 1;
            }
            Err(e) => report.fail(index, Some(node_id), e.to_string()),
        }
    }
}

fn attach(
    ctx: &mut SceneContext<'_>,
    record: &MeshRecord,
    mesh: Mesh,
) -> scpatch_scene::Result<NodeId> {
    let mesh = ctx.model.insert_mesh(mesh);
    let instance = ctx.model.instance(mesh)?;
    let inclusion = ctx.model.include_self();

    let child = ctx.tree.create_child(record.parent_node_id)?;
    ctx.tree
        .set_generic_id(child, &record.node_id.to_string())?;
    ctx.tree
        .set_node_name(child, &format!("mesh {}", record.node_id))?;
    let body = ctx.tree.create_body_instance(child)?;
    ctx.tree
        .set_body_instance_mesh_instance(body, InstanceInc::new(inclusion, instance))?;
    Ok(child)
}
