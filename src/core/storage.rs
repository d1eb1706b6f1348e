use crate::core::{DocumentStore, NormalizedRecord, PipelineRun, StorageReport, StoreConnection};
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Persists one batch and reports the run's total latency.
///
/// The connection is opened here and released before returning on every
/// path, including a failed write. Nothing is retried.
pub fn store<S: DocumentStore>(
    store: &S,
    batch: Vec<NormalizedRecord>,
    run: PipelineRun,
) -> Result<StorageReport> {
    let mut conn = store.connect()?;

    tracing::debug!("Persisting batch of {} records", batch.len());
    let outcome = conn.insert_many(&batch).map(|persisted| {
        let elapsed = run.elapsed();
        tracing::info!("⏱️ Total execution time: {}ms", elapsed.as_millis());
        StorageReport { persisted, elapsed }
    });

    if let Err(e) = conn.close() {
        tracing::warn!("Failed to release store connection: {}", e);
    }

    outcome
}

pub struct StorageStage;

impl StorageStage {
    pub fn spawn<S: DocumentStore>(
        backend: Arc<S>,
        batch: Vec<NormalizedRecord>,
        run: PipelineRun,
    ) -> oneshot::Receiver<Result<StorageReport>> {
        let (tx, rx) = oneshot::channel();

        tokio::task::spawn_blocking(move || {
            let outcome = store(backend.as_ref(), batch, run);
            if tx.send(outcome).is_err() {
                tracing::debug!("Coordinator dropped, storage outcome discarded");
            }
        });

        rx
    }
}
