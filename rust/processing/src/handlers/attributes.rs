// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `attributes`: attach string attributes to nodes.

use super::{decoded, SceneContext};
use crate::report::SectionReport;
use scpatch_core::{AttributeRecord, Decoded};
use scpatch_scene::AttributeType;

pub fn apply(
    records: &[Decoded<AttributeRecord>],
    ctx: &mut SceneContext<'_>,
    report: &mut SectionReport,
) {
    for (index, record) in records.iter().enumerate() {
        let Some(record) = decoded(index, record, report) else {
            continue;
        };
        if !record.extra_keys.is_empty() {
            report.note(format!(
                "record {index}: ignored keys after `{}`: {}",
                record.name,
                record.extra_keys.join(", ")
            ));
        }

        match ctx.tree.add_attribute(
            record.node_id,
            &record.name,
            AttributeType::String,
            &record.value,
        ) {
            Ok(()) => {
                tracing::debug!(
                    node_id = record.node_id,
                    name = %record.name,
                    value = %record.value,
                    "Set attribute"
                );
                report.applied += 1;
            }
            Err(e) => report.fail(index, Some(record.node_id), e.to_string()),
        }
    }
}
