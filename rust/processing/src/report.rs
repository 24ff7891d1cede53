// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run and section reports.

use scpatch_core::Position;
use scpatch_scene::{ArtifactKind, StreamInfo};
use serde::Serialize;

/// How a section was handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SectionStatus {
    Applied,
    /// Unrecognized section name.
    Unknown,
    /// Recognized name, unusable value.
    Malformed(String),
}

/// A record that was decoded or applied unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationFailure {
    /// Position of the record in its section.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<u32>,
    pub reason: String,
}

/// Outcome of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionReport {
    pub name: String,
    #[serde(flatten)]
    pub status: SectionStatus,
    /// Records in the section.
    pub records: usize,
    /// Records that mutated the scene.
    pub applied: usize,
    pub failures: Vec<MutationFailure>,
    /// Recoverable oddities: extra keys, dropped channels, ignored forms.
    pub notes: Vec<String>,
}

impl SectionReport {
    pub fn new(name: impl Into<String>, records: usize) -> Self {
        Self {
            name: name.into(),
            status: SectionStatus::Applied,
            records,
            applied: 0,
            failures: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub(crate) fn with_status(mut self, status: SectionStatus) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn fail(&mut self, index: usize, node_id: Option<u32>, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(section = %self.name, index, ?node_id, %reason, "Record not applied");
        self.failures.push(MutationFailure {
            index,
            node_id,
            reason,
        });
    }

    pub(crate) fn note(&mut self, note: impl Into<String>) {
        let note = note.into();
        tracing::info!(section = %self.name, %note, "Section note");
        self.notes.push(note);
    }
}

/// Patch text that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// What the snapshot manager did with one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineAction {
    /// Live artifact overwritten from its sidecar.
    Restored,
    /// Sidecar created from the live artifact.
    Captured,
    /// Neither exists.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaselineEntry {
    pub artifact: String,
    pub action: BaselineAction,
}

impl BaselineEntry {
    pub(crate) fn new(kind: ArtifactKind, action: BaselineAction) -> Self {
        Self {
            artifact: kind.extension().to_string(),
            action,
        }
    }
}

/// Everything a run did.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RunReport {
    pub model: String,
    pub baseline: Vec<BaselineEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<ParseFailure>,
    pub sections: Vec<SectionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamInfo>,
    pub total_time_ms: u64,
}

impl RunReport {
    /// Number of failed records across all sections.
    pub fn failure_count(&self) -> usize {
        self.sections.iter().map(|s| s.failures.len()).sum()
    }

    pub fn applied_count(&self) -> usize {
        self.sections.iter().map(|s| s.applied).sum()
    }

    pub fn section(&self, name: &str) -> Option<&SectionReport> {
        self.sections.iter().find(|s| s.name == name)
    }
}
