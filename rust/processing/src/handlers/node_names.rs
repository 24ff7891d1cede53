// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `nodeNames`: rename nodes.

use super::{decoded, SceneContext};
use crate::report::SectionReport;
use scpatch_core::{Decoded, NodeRenameRecord};

pub fn apply(
    records: &[Decoded<NodeRenameRecord>],
    ctx: &mut SceneContext<'_>,
    report: &mut SectionReport,
) {
    for (index, record) in records.iter().enumerate() {
        let Some(record) = decoded(index, record, report) else {
            continue;
        };
        match ctx.tree.set_node_name(record.node_id, &record.node_name) {
            Ok(()) => {
                tracing::debug!(node_id = record.node_id, name = %record.node_name, "Renamed node");
                report.applied += 1;
            }
            Err(e) => report.fail(index, Some(record.node_id), e.to_string()),
        }
    }
}
