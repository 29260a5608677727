//! Content sync worker
//!
//! Status transitions that reach `inProgress` or `completed` also patch the
//! linked content record. That patch is best-effort by contract: the
//! order's own update has already committed, and a failed patch must never
//! unwind it. Making the queue explicit keeps the at-most-once semantics
//! visible instead of burying an ignored error in the engine.

use crate::db::repository::post;
use shared::models::PostStatus;
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A pending patch of one content record's status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPatch {
    pub post_id: i64,
    pub status: PostStatus,
}

/// Cheap clonable sender half, held in server state
#[derive(Debug, Clone)]
pub struct ContentSyncHandle {
    tx: mpsc::UnboundedSender<ContentPatch>,
}

impl ContentSyncHandle {
    /// Queue a patch. Never fails: a closed channel (shutdown in flight)
    /// just drops the patch, which the contract allows.
    pub fn enqueue(&self, patch: ContentPatch) {
        if let Err(e) = self.tx.send(patch) {
            tracing::warn!(post_id = e.0.post_id, "Content sync queue closed, patch dropped");
        }
    }
}

/// Receiver half draining the queue against the database
pub struct ContentSyncWorker {
    pool: SqlitePool,
    rx: mpsc::UnboundedReceiver<ContentPatch>,
}

/// Create an unstarted worker plus its handle. Tests drive the worker
/// directly via [`ContentSyncWorker::drain`].
pub fn channel(pool: SqlitePool) -> (ContentSyncHandle, ContentSyncWorker) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ContentSyncHandle { tx }, ContentSyncWorker { pool, rx })
}

/// Create a worker, spawn it onto the runtime, and return the handle
pub fn spawn(pool: SqlitePool, shutdown: CancellationToken) -> ContentSyncHandle {
    let (handle, worker) = channel(pool);
    tokio::spawn(worker.run(shutdown));
    handle
}

impl ContentSyncWorker {
    /// Run until shutdown is requested or every sender is gone
    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!("Content sync worker started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Content sync worker received shutdown signal");
                    break;
                }
                patch = self.rx.recv() => {
                    let Some(patch) = patch else {
                        tracing::info!("Content sync channel closed, worker stopping");
                        break;
                    };
                    self.apply(patch).await;
                }
            }
        }
    }

    /// Drain every queued patch, then stop. Only meaningful once all
    /// handles are dropped; used by tests for deterministic completion.
    pub async fn drain(mut self) {
        while let Some(patch) = self.rx.recv().await {
            self.apply(patch).await;
        }
    }

    async fn apply(&self, patch: ContentPatch) {
        match post::update_status(&self.pool, patch.post_id, patch.status).await {
            Ok(true) => {
                tracing::debug!(post_id = patch.post_id, status = %patch.status, "Post status synced");
            }
            Ok(false) => {
                tracing::warn!(post_id = patch.post_id, "Post missing, status patch skipped");
            }
            Err(e) => {
                // At-most-once: log and move on, the order update stands
                tracing::warn!(post_id = patch.post_id, error = %e, "Post status patch failed");
            }
        }
    }
}
