// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Errors that abort a run.
//!
//! Everything recoverable (bad records, unknown nodes, unknown sections,
//! unparseable patch text) lands in the [`crate::RunReport`] instead.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Model store or assembly tree failure, including artifact codecs.
    #[error("scene store error: {0}")]
    Scene(#[from] scpatch_scene::Error),

    /// A baseline copy could not be completed.
    #[error("baseline copy {} -> {} failed: {}", .from.display(), .to.display(), .source)]
    Baseline {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
