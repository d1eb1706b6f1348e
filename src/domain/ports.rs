use crate::domain::model::{NormalizedRecord, PersistedRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn fetch_timeout(&self) -> Duration;
    fn store_uri(&self) -> &str;
    fn collection(&self) -> &str;
}

/// Remote source of raw records. The payload is returned untyped; shape
/// checks belong to the processing stage.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self) -> Result<serde_json::Value>;
}

/// Connection factory for the durable store. Connections are opened per run
/// and never shared between runs.
pub trait DocumentStore: Send + Sync + 'static {
    type Connection: StoreConnection;

    fn connect(&self) -> Result<Self::Connection>;
}

pub trait StoreConnection: Send {
    fn insert_one(&mut self, record: &NormalizedRecord) -> Result<PersistedRecord>;

    fn insert_many(&mut self, records: &[NormalizedRecord]) -> Result<Vec<PersistedRecord>> {
        records.iter().map(|r| self.insert_one(r)).collect()
    }

    fn close(self) -> Result<()>;
}
