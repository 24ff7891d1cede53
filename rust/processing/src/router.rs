// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Section dispatch.

use crate::handlers::{self, SceneContext};
use crate::report::{ParseFailure, SectionReport, SectionStatus};
use scpatch_core::{PatchDocument, Section};

/// Result of applying patch text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatchOutcome {
    pub parse_error: Option<ParseFailure>,
    pub sections: Vec<SectionReport>,
}

/// Apply every section of a decoded document, in document order.
pub fn apply_patch(document: &PatchDocument, ctx: &mut SceneContext<'_>) -> Vec<SectionReport> {
    document
        .sections
        .iter()
        .map(|section| apply_section(section, ctx))
        .collect()
}

/// Parse and apply raw patch text.
///
/// A parse failure is reported in the outcome; the scene is left untouched.
pub fn apply_patch_text(text: &str, ctx: &mut SceneContext<'_>) -> PatchOutcome {
    match PatchDocument::parse(text) {
        Ok(document) => PatchOutcome {
            parse_error: None,
            sections: apply_patch(&document, ctx),
        },
        Err(e) => {
            tracing::error!(error = %e, "Patch document could not be parsed");
            PatchOutcome {
                parse_error: Some(ParseFailure {
                    message: e.to_string(),
                    position: e.position(),
                }),
                sections: Vec::new(),
            }
        }
    }
}

fn apply_section(section: &Section, ctx: &mut SceneContext<'_>) -> SectionReport {
    let mut report = SectionReport::new(section.name(), section.len());
    match section {
        Section::Attributes(records) => handlers::attributes::apply(records, ctx, &mut report),
        Section::NodeNames(records) => handlers::node_names::apply(records, ctx, &mut report),
        Section::Colors(records) => handlers::colors::apply(records, ctx, &mut report),
        Section::DefaultCamera(records) => handlers::camera::apply(records, ctx, &mut report),
        Section::Meshes(records) => handlers::meshes::apply(records, ctx, &mut report),
        Section::Unknown(name) => {
            tracing::warn!(section = %name, "Unknown patch section skipped");
            return report.with_status(SectionStatus::Unknown);
        }
        Section::Malformed { name, reason } => {
            tracing::warn!(section = %name, %reason, "Malformed patch section skipped");
            return report.with_status(SectionStatus::Malformed(reason.clone()));
        }
    }
    tracing::info!(
        section = %report.name,
        records = report.records,
        applied = report.applied,
        failed = report.failures.len(),
        "Section applied"
    );
    report
}
