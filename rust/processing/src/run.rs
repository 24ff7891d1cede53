// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run orchestration.
//!
//! A run walks the phases of [`RunPhase`] strictly in order:
//! restore the baseline, open the scene, apply the patch, write the tree
//! back into the model, regenerate the artifacts. Only the baseline
//! sidecars outlive a run.

use crate::baseline;
use crate::error::Result;
use crate::handlers::SceneContext;
use crate::report::{BaselineAction, RunReport};
use crate::router::apply_patch_text;
use scpatch_scene::{ArtifactSet, AssemblyTree, Model};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;

/// Where the artifacts live and which model to patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub output_dir: PathBuf,
    pub model_name: String,
}

impl RunConfig {
    pub fn new(output_dir: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            model_name: model_name.into(),
        }
    }

    pub fn artifacts(&self) -> ArtifactSet {
        ArtifactSet::new(&self.output_dir, &self.model_name)
    }
}

/// Phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    RestoreBaseline,
    SceneOpened,
    PatchApplied,
    Reserialized,
    ArtifactsRegenerated,
}

impl RunPhase {
    /// The phase that follows this one; the last phase returns to `Idle`.
    pub fn next(self) -> RunPhase {
        match self {
            RunPhase::Idle => RunPhase::RestoreBaseline,
            RunPhase::RestoreBaseline => RunPhase::SceneOpened,
            RunPhase::SceneOpened => RunPhase::PatchApplied,
            RunPhase::PatchApplied => RunPhase::Reserialized,
            RunPhase::Reserialized => RunPhase::ArtifactsRegenerated,
            RunPhase::ArtifactsRegenerated => RunPhase::Idle,
        }
    }
}

/// One patch run against one artifact set.
pub struct Run {
    config: RunConfig,
    phase: RunPhase,
}

impl Run {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            phase: RunPhase::Idle,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    fn advance(&mut self) {
        let next = self.phase.next();
        tracing::debug!(from = ?self.phase, to = ?next, "Run phase");
        self.phase = next;
    }

    /// Execute all phases with `patch_text`.
    ///
    /// Only scene store and file system failures return `Err`; the phase is
    /// left where the failure happened.
    pub fn execute(&mut self, patch_text: &str) -> Result<RunReport> {
        let start = Instant::now();
        let set = self.config.artifacts();
        std::fs::create_dir_all(set.dir())?;
        tracing::info!(
            dir = %set.dir().display(),
            model = %set.model_name(),
            patch_size = patch_text.len(),
            "Starting patch run"
        );

        self.advance();
        let mut baseline = baseline::restore_or_capture(&set)?;

        self.advance();
        let mut model = set.open_model()?;
        let mut tree = set.open_tree(&model)?;
        tracing::info!(
            nodes = tree.len(),
            meshes = model.mesh_count(),
            instances = model.instance_count(),
            "Scene opened"
        );
        if baseline
            .iter()
            .any(|entry| entry.action == BaselineAction::Missing)
        {
            // The unpatched scene becomes the baseline of every later run.
            reserialize(&set, &tree, &mut model)?;
            set.write_model(&mut model)?;
            baseline::capture_missing(&set, &mut baseline)?;
        }

        self.advance();
        let outcome = {
            let mut ctx = SceneContext::new(&mut tree, &mut model);
            apply_patch_text(patch_text, &mut ctx)
        };

        self.advance();
        reserialize(&set, &tree, &mut model)?;

        self.advance();
        set.write_model(&mut model)?;

        self.advance();
        let report = RunReport {
            model: self.config.model_name.clone(),
            baseline,
            parse_error: outcome.parse_error,
            sections: outcome.sections,
            stream: model.stream_info().cloned(),
            total_time_ms: start.elapsed().as_millis() as u64,
        };
        tracing::info!(
            applied = report.applied_count(),
            failed = report.failure_count(),
            total_time_ms = report.total_time_ms,
            "Patch run complete"
        );
        Ok(report)
    }
}

fn reserialize(set: &ArtifactSet, tree: &AssemblyTree, model: &mut Model) -> Result<()> {
    tree.serialize_to_model(model)?;
    set.write_tree(tree)?;
    Ok(())
}

/// Run `patch_text` against the artifacts named by `config`.
pub fn run_patch(config: &RunConfig, patch_text: &str) -> Result<RunReport> {
    Run::new(config.clone()).execute(patch_text)
}
