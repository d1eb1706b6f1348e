pub mod coordinator;
pub mod processing;
pub mod sequential;
pub mod storage;
pub mod transform;

pub use crate::domain::model::{
    NormalizedRecord, PersistedRecord, PipelineRun, RawRecord, StorageReport,
};
pub use crate::domain::ports::{ConfigProvider, DocumentStore, RecordSource, StoreConnection};
pub use crate::utils::error::Result;
