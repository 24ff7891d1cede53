// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Baseline snapshots.
//!
//! The first run against a set of artifacts copies each one to a `.orig`
//! sidecar. Every later run first restores the live artifacts from those
//! sidecars, so the same patch applied twice gives the same result.

use crate::error::{Error, Result};
use crate::report::{BaselineAction, BaselineEntry};
use scpatch_scene::{ArtifactKind, ArtifactSet};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Restore each artifact from its sidecar, or capture the sidecar if there
/// is none yet. Must run before the scene is opened.
pub fn restore_or_capture(set: &ArtifactSet) -> Result<Vec<BaselineEntry>> {
    ArtifactKind::ALL
        .iter()
        .map(|&kind| {
            let live = set.path(kind);
            let sidecar = set.sidecar(kind);
            let action = if sidecar.is_file() {
                copy_complete(&sidecar, &live)?;
                BaselineAction::Restored
            } else if live.is_file() {
                copy_complete(&live, &sidecar)?;
                BaselineAction::Captured
            } else {
                BaselineAction::Missing
            };
            tracing::info!(artifact = %kind, action = ?action, "Baseline");
            Ok(BaselineEntry::new(kind, action))
        })
        .collect()
}

/// Capture sidecars for artifacts that were `Missing` when the run started.
///
/// The caller must have written the unpatched scene to the live paths first.
pub fn capture_missing(set: &ArtifactSet, entries: &mut [BaselineEntry]) -> Result<()> {
    for (kind, entry) in ArtifactKind::ALL.into_iter().zip(entries.iter_mut()) {
        if entry.action != BaselineAction::Missing {
            continue;
        }
        let live = set.path(kind);
        if live.is_file() {
            copy_complete(&live, &set.sidecar(kind))?;
            entry.action = BaselineAction::Captured;
            tracing::info!(artifact = %kind, "Baseline captured from opened scene");
        }
    }
    Ok(())
}

/// Remove all sidecars so the next run captures a fresh baseline.
pub fn discard(set: &ArtifactSet) -> Result<usize> {
    let mut removed = 0;
    for kind in ArtifactKind::ALL {
        let sidecar = set.sidecar(kind);
        match std::fs::remove_file(&sidecar) {
            Ok(()) => {
                tracing::debug!(path = %sidecar.display(), "Removed baseline sidecar");
                removed += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(removed)
}

/// Whole-file copy that only replaces `to` once every byte is on disk.
fn copy_complete(from: &Path, to: &Path) -> Result<()> {
    let wrap = |source: io::Error| Error::Baseline {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    let dir = to
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir).map_err(wrap)?;
    let mut source = File::open(from).map_err(wrap)?;
    let bytes = io::copy(&mut source, temp.as_file_mut()).map_err(wrap)?;
    temp.as_file_mut().flush().map_err(wrap)?;
    temp.as_file().sync_all().map_err(wrap)?;
    temp.persist(to).map_err(|e| wrap(e.error))?;

    tracing::debug!(from = %from.display(), to = %to.display(), bytes, "Copied artifact");
    Ok(())
}
