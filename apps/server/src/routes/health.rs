// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Service status and endpoint listing.

use crate::AppState;
use axum::{extract::State, Json};
use scpatch_processing::{ArtifactKind, ArtifactSet};
use serde::Serialize;

/// Status of the configured model's artifacts.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
    pub output_dir: String,
    /// True while a patch run holds the artifacts.
    pub busy: bool,
    pub artifacts: Vec<ArtifactStatus>,
}

/// Presence of one artifact and of its baseline sidecar.
#[derive(Debug, Serialize)]
pub struct ArtifactStatus {
    pub artifact: &'static str,
    pub present: bool,
    pub baseline: bool,
}

impl ArtifactStatus {
    fn of(set: &ArtifactSet, kind: ArtifactKind) -> Self {
        Self {
            artifact: kind.extension(),
            present: set.path(kind).is_file(),
            baseline: set.sidecar(kind).is_file(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RouteListing {
    pub service: &'static str,
    pub version: &'static str,
    pub routes: &'static [Route],
}

#[derive(Debug, Serialize)]
pub struct Route {
    pub method: &'static str,
    pub path: &'static str,
    pub summary: &'static str,
}

const ROUTES: &[Route] = &[
    Route {
        method: "GET",
        path: "/api/v1/health",
        summary: "Artifact and baseline status of the configured model",
    },
    Route {
        method: "POST",
        path: "/api/v1/patch",
        summary: "Apply a patch document and regenerate the artifacts",
    },
];

/// GET /api/v1/health
pub async fn check(State(state): State<AppState>) -> Json<StatusResponse> {
    let set = state.config.run_config().artifacts();
    Json(StatusResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model: state.config.model_name.clone(),
        output_dir: state.config.output_dir.display().to_string(),
        busy: state.run_lock.try_lock().is_err(),
        artifacts: ArtifactKind::ALL
            .into_iter()
            .map(|kind| ArtifactStatus::of(&set, kind))
            .collect(),
    })
}

/// GET /
pub async fn info() -> Json<RouteListing> {
    Json(RouteListing {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        routes: ROUTES,
    })
}
