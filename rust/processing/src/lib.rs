// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Patch application pipeline shared by the command line tool and the server.
//!
//! [`run_patch`] is the entry point: it restores the baseline artifacts,
//! opens the scene, routes every section of the patch to its handler,
//! writes the tree back into the model and regenerates all artifacts.

pub mod baseline;
pub mod error;
pub mod handlers;
pub mod report;
pub mod router;
pub mod run;
pub mod seed;

pub use error::{Error, Result};
pub use handlers::SceneContext;
pub use report::{
    BaselineAction, BaselineEntry, MutationFailure, ParseFailure, RunReport, SectionReport,
    SectionStatus,
};
pub use router::{apply_patch, apply_patch_text, PatchOutcome};
pub use run::{run_patch, Run, RunConfig, RunPhase};
pub use scpatch_scene::{ArtifactKind, ArtifactSet};
pub use seed::{init_scene, seed_scene};

/// Patch applied when none is supplied: touches every section kind against
/// the scene written by [`init_scene`].
pub const SAMPLE_PATCH: &str = include_str!("../data/sample_patch.json");
