use crate::core::processing::ProcessingStage;
use crate::core::storage::StorageStage;
use crate::core::{DocumentStore, PipelineRun, RecordSource};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Fetching,
    DispatchedToProcessing,
    DispatchedToStorage,
    Done,
    Error,
}

/// What the coordinator observed during one run.
#[derive(Debug)]
pub struct RunReport {
    pub state: RunState,
    pub transitions: Vec<RunState>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Number of array elements fetched; `None` when the payload was not an array.
    pub fetched: Option<usize>,
    pub processed: usize,
    pub persisted: usize,
    pub elapsed: Option<Duration>,
    /// Cause of the `Error` state.
    pub error: Option<EtlError>,
    /// A storage failure does not move the run to `Error`; it is kept here.
    pub storage_error: Option<EtlError>,
}

impl RunReport {
    fn new(run: &PipelineRun) -> Self {
        Self {
            state: RunState::Idle,
            transitions: vec![RunState::Idle],
            started_at: run.started_at,
            finished_at: run.started_at,
            fetched: None,
            processed: 0,
            persisted: 0,
            elapsed: None,
            error: None,
            storage_error: None,
        }
    }

    fn advance(&mut self, next: RunState) {
        tracing::debug!("Run state {:?} -> {:?}", self.state, next);
        self.state = next;
        self.transitions.push(next);
    }

    fn fail(mut self, err: EtlError) -> Self {
        tracing::error!("❌ Run aborted in {:?}: {}", self.state, err);
        self.advance(RunState::Error);
        self.error = Some(err);
        self.finish()
    }

    fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        tracing::info!(
            "🏁 Run ended {:?} at {}",
            self.state,
            self.finished_at.to_rfc3339()
        );
        self
    }

    pub fn is_success(&self) -> bool {
        self.state == RunState::Done && self.storage_error.is_none()
    }

    /// The aborting error if any, else the storage error if one was reported.
    pub fn into_result(self) -> Result<()> {
        match self.error.or(self.storage_error) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Sequences one fetch, one processing dispatch and one storage dispatch.
///
/// Stages are spawned fresh for every run and never cancelled once started.
/// Only the fetch is time-bounded.
pub struct Coordinator<R: RecordSource, S: DocumentStore> {
    source: R,
    store: Arc<S>,
}

impl<R: RecordSource, S: DocumentStore> Coordinator<R, S> {
    pub fn new(source: R, store: S) -> Self {
        Self {
            source,
            store: Arc::new(store),
        }
    }

    pub async fn run(&self) -> RunReport {
        let run = PipelineRun::start();
        let mut report = RunReport::new(&run);
        tracing::info!("🚀 Run started at {}", run.started_at.to_rfc3339());

        report.advance(RunState::Fetching);
        let payload = match self.source.fetch().await {
            Ok(payload) => payload,
            Err(e) => return report.fail(e),
        };
        report.fetched = payload.as_array().map(Vec::len);
        tracing::debug!("Fetched payload with {:?} records", report.fetched);

        report.advance(RunState::DispatchedToProcessing);
        let normalized = match ProcessingStage::spawn(payload).await {
            Ok(normalized) => normalized,
            Err(_) => {
                return report.fail(EtlError::StageError {
                    stage: "processing".to_string(),
                })
            }
        };
        report.processed = normalized.len();

        report.advance(RunState::DispatchedToStorage);
        match StorageStage::spawn(self.store.clone(), normalized, run).await {
            Ok(Ok(stored)) => {
                report.persisted = stored.persisted.len();
                report.elapsed = Some(stored.elapsed);
            }
            Ok(Err(e)) => {
                tracing::error!("❌ Error in data storage stage: {}", e);
                report.storage_error = Some(e);
            }
            Err(_) => {
                return report.fail(EtlError::StageError {
                    stage: "storage".to_string(),
                })
            }
        }

        report.advance(RunState::Done);
        report.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{NormalizedRecord, PersistedRecord, StoreConnection};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StaticSource(Value);

    #[async_trait::async_trait]
    impl RecordSource for StaticSource {
        async fn fetch(&self) -> Result<Value> {
            Ok(self.0.clone())
        }
    }

    struct TimedOutSource;

    #[async_trait::async_trait]
    impl RecordSource for TimedOutSource {
        async fn fetch(&self) -> Result<Value> {
            Err(EtlError::FetchTimeout {
                endpoint: "http://localhost/users".to_string(),
                timeout_ms: 5000,
            })
        }
    }

    #[derive(Clone, Default)]
    struct MockStore {
        docs: Arc<Mutex<Vec<PersistedRecord>>>,
        connects: Arc<AtomicUsize>,
        fail_writes: bool,
        panic_on_connect: bool,
    }

    struct MockConnection {
        docs: Arc<Mutex<Vec<PersistedRecord>>>,
        fail_writes: bool,
    }

    impl DocumentStore for MockStore {
        type Connection = MockConnection;

        fn connect(&self) -> Result<MockConnection> {
            if self.panic_on_connect {
                panic!("store exploded");
            }
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(MockConnection {
                docs: self.docs.clone(),
                fail_writes: self.fail_writes,
            })
        }
    }

    impl StoreConnection for MockConnection {
        fn insert_one(&mut self, record: &NormalizedRecord) -> Result<PersistedRecord> {
            if self.fail_writes {
                return Err(EtlError::storage_write("duplicate key"));
            }
            let mut docs = self.docs.lock().unwrap();
            let persisted = PersistedRecord {
                id: docs.len() as i64 + 1,
                record: record.clone(),
            };
            docs.push(persisted.clone());
            Ok(persisted)
        }

        fn close(self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_single_user() {
        let store = MockStore::default();
        let source = StaticSource(json!([
            {"name": "Leanne", "username": "Bret", "email": "a@b.com"}
        ]));
        let coordinator = Coordinator::new(source, store.clone());

        let report = coordinator.run().await;

        assert!(report.is_success());
        assert_eq!(
            report.transitions,
            vec![
                RunState::Idle,
                RunState::Fetching,
                RunState::DispatchedToProcessing,
                RunState::DispatchedToStorage,
                RunState::Done,
            ]
        );
        assert_eq!(report.fetched, Some(1));
        assert_eq!(report.persisted, 1);
        assert!(report.elapsed.is_some());
        assert!(report.finished_at >= report.started_at);

        let docs = store.docs.lock().unwrap();
        assert_eq!(
            docs[0].record,
            NormalizedRecord {
                name: "Leanne".to_string(),
                age: 4,
                email: "a@b.com".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_run_empty_payload_still_stores() {
        let store = MockStore::default();
        let coordinator = Coordinator::new(StaticSource(json!([])), store.clone());

        let report = coordinator.run().await;

        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.persisted, 0);
        assert!(report.elapsed.is_some());
        assert_eq!(store.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_fetch_timeout_spawns_no_stage() {
        let store = MockStore::default();
        let coordinator = Coordinator::new(TimedOutSource, store.clone());

        let report = coordinator.run().await;

        assert_eq!(report.state, RunState::Error);
        assert_eq!(
            report.transitions,
            vec![RunState::Idle, RunState::Fetching, RunState::Error]
        );
        assert!(matches!(report.error, Some(EtlError::FetchTimeout { .. })));
        assert_eq!(store.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_null_payload_degrades_to_empty_batch() {
        let store = MockStore::default();
        let coordinator = Coordinator::new(StaticSource(Value::Null), store.clone());

        let report = coordinator.run().await;

        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.fetched, None);
        assert_eq!(report.processed, 0);
        assert!(report.error.is_none());
        assert_eq!(store.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_storage_error_is_observed_but_run_completes() {
        let store = MockStore {
            fail_writes: true,
            ..Default::default()
        };
        let source = StaticSource(json!([{"name": "Leanne", "username": "Bret"}]));
        let coordinator = Coordinator::new(source, store);

        let report = coordinator.run().await;

        assert_eq!(report.state, RunState::Done);
        assert!(!report.is_success());
        assert!(report.error.is_none());
        assert!(matches!(
            report.storage_error,
            Some(EtlError::StorageWriteError { .. })
        ));
        assert!(report.elapsed.is_none());
        assert!(matches!(
            report.into_result(),
            Err(EtlError::StorageWriteError { .. })
        ));
    }

    #[tokio::test]
    async fn test_storage_stage_panic_moves_run_to_error() {
        let store = MockStore {
            panic_on_connect: true,
            ..Default::default()
        };
        let coordinator = Coordinator::new(StaticSource(json!([])), store);

        let report = coordinator.run().await;

        assert_eq!(report.state, RunState::Error);
        assert!(matches!(report.error, Some(EtlError::StageError { .. })));
    }

    #[tokio::test]
    async fn test_runs_do_not_share_state() {
        let store = MockStore::default();
        let source = StaticSource(json!([
            {"name": "A", "username": "a", "email": "a@x.io"},
            {"name": "B", "username": "bb", "email": "b@x.io"}
        ]));
        let coordinator = Coordinator::new(source, store.clone());

        let (first, second) = tokio::join!(coordinator.run(), coordinator.run());

        assert!(first.is_success());
        assert!(second.is_success());
        assert_eq!(store.connects.load(Ordering::SeqCst), 2);
        assert_eq!(store.docs.lock().unwrap().len(), 4);
    }
}
