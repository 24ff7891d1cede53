// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Patch endpoint.

use crate::error::ApiError;
use crate::AppState;
use axum::{body::Body, extract::State, Json};
use scpatch_processing::{run_patch, RunReport};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinError;

/// POST /api/v1/patch - Apply the request body as a patch document.
///
/// Runs are serialized: every run restores and rewrites the same artifacts.
pub async fn apply(
    State(state): State<AppState>,
    body: Body,
) -> Result<Json<RunReport>, ApiError> {
    let max_bytes = state.config.max_patch_bytes();
    let bytes = axum::body::to_bytes(body, max_bytes)
        .await
        .map_err(|_| ApiError::PatchTooLarge {
            max_mb: state.config.max_patch_size_mb,
        })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::EmptyPatch);
    }
    let text = String::from_utf8(bytes.to_vec())?;
    tracing::debug!(size = text.len(), "Received patch");

    let config = state.config.run_config();
    let report =
        run_exclusive(state.run_lock.clone(), move || run_patch(&config, &text)).await??;

    tracing::info!(
        model = %report.model,
        applied = report.applied_count(),
        failed = report.failure_count(),
        parse_error = report.parse_error.is_some(),
        total_time_ms = report.total_time_ms,
        "Patch applied"
    );
    Ok(Json(report))
}

/// Run `work` on the blocking pool while holding `lock`.
///
/// The guard lives inside the blocking task, so the lock stays held until
/// `work` returns even if the awaiting request is dropped.
pub(crate) async fn run_exclusive<T, F>(lock: Arc<Mutex<()>>, work: F) -> Result<T, JoinError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let guard = lock.lock_owned().await;
    tokio::task::spawn_blocking(move || {
        let _guard = guard;
        work()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_lock_held_until_blocking_work_ends() {
        let lock = Arc::new(Mutex::new(()));
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let request = tokio::spawn(run_exclusive(lock.clone(), move || {
            started_tx.send(()).unwrap();
            release_rx.recv().unwrap();
        }));
        tokio::task::spawn_blocking(move || started_rx.recv().unwrap())
            .await
            .unwrap();

        // A request timeout drops the awaiting future.
        request.abort();
        assert!(request.await.unwrap_err().is_cancelled());
        assert!(lock.try_lock().is_err());

        release_tx.send(()).unwrap();
        let reacquired = tokio::time::timeout(Duration::from_secs(5), lock.lock()).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn test_runs_do_not_overlap() {
        let lock = Arc::new(Mutex::new(()));
        let active = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let active = active.clone();
                tokio::spawn(run_exclusive(lock.clone(), move || {
                    let overlapping = active.fetch_add(1, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(5));
                    active.fetch_sub(1, Ordering::SeqCst);
                    overlapping
                }))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 0);
        }
    }
}
