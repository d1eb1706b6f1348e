use crate::core::processing::process;
use crate::core::{
    DocumentStore, PersistedRecord, PipelineRun, RecordSource, StorageReport, StoreConnection,
};
use crate::utils::error::Result;

/// Single control flow variant: fetch, transform and store inline without
/// any worker stages. Useful as a latency baseline for the staged pipeline.
///
/// Store calls run on the caller's task.
pub struct SequentialRunner<R: RecordSource, S: DocumentStore> {
    source: R,
    store: S,
}

impl<R: RecordSource, S: DocumentStore> SequentialRunner<R, S> {
    pub fn new(source: R, store: S) -> Self {
        Self { source, store }
    }

    pub async fn run(&self) -> Result<StorageReport> {
        let run = PipelineRun::start();
        tracing::info!("🚀 Sequential run started at {}", run.started_at.to_rfc3339());

        let outcome = self.fetch_process_store().await;

        // Reported on failure too.
        let elapsed = run.elapsed();
        tracing::info!("⏱️ Total execution time: {}ms", elapsed.as_millis());

        match outcome {
            Ok(persisted) => Ok(StorageReport { persisted, elapsed }),
            Err(e) => {
                tracing::error!("❌ Sequential run failed: {}", e);
                Err(e)
            }
        }
    }

    async fn fetch_process_store(&self) -> Result<Vec<PersistedRecord>> {
        let payload = self.source.fetch().await?;
        let normalized = process(payload);

        let mut conn = self.store.connect()?;
        let written = conn.insert_many(&normalized);
        if let Err(e) = conn.close() {
            tracing::warn!("Failed to release store connection: {}", e);
        }
        written
    }
}
