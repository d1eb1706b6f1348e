use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// A record as delivered by the source. The shape is untrusted, so the
/// fields stay as raw JSON until the transform picks them apart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl RawRecord {
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }
}

impl From<serde_json::Value> for RawRecord {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(data) => Self { data },
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub name: String,
    pub age: i64,
    pub email: String,
}

/// A normalized record after the store has assigned it an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub id: i64,
    #[serde(flatten)]
    pub record: NormalizedRecord,
}

/// Timing context for a single fetch-process-store cycle.
#[derive(Debug, Clone, Copy)]
pub struct PipelineRun {
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl PipelineRun {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Monotonic time since the run began; never negative.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Outcome of a successful storage stage.
#[derive(Debug, Clone)]
pub struct StorageReport {
    pub persisted: Vec<PersistedRecord>,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_from_non_object_is_empty() {
        let record = RawRecord::from(serde_json::json!("not an object"));
        assert!(record.data.is_empty());

        let record = RawRecord::from(serde_json::json!({"username": "Bret"}));
        assert_eq!(record.str_field("username"), Some("Bret"));
        assert_eq!(record.str_field("email"), None);
    }

    #[test]
    fn test_pipeline_run_elapsed_is_monotonic() {
        let run = PipelineRun::start();
        let first = run.elapsed();
        let second = run.elapsed();
        assert!(second >= first);
        assert!(run.started_at <= Utc::now());
    }

    #[test]
    fn test_persisted_record_serializes_flat() {
        let persisted = PersistedRecord {
            id: 7,
            record: NormalizedRecord {
                name: "Leanne".to_string(),
                age: 4,
                email: "a@b.com".to_string(),
            },
        };
        let json = serde_json::to_value(&persisted).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "name": "Leanne", "age": 4, "email": "a@b.com"})
        );
    }
}
