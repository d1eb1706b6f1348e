use crate::core::transform::transform;
use crate::core::{NormalizedRecord, RawRecord};
use crate::utils::error::EtlError;
use serde_json::Value;
use tokio::sync::oneshot;

/// Normalizes a fetched payload. Anything other than an array degrades to an
/// empty batch with a warning instead of failing the run.
pub fn process(input: Value) -> Vec<NormalizedRecord> {
    match input {
        Value::Array(items) => items
            .into_iter()
            .map(|item| transform(&RawRecord::from(item)))
            .collect(),
        other => {
            let err = EtlError::MalformedInput {
                found: json_kind(&other).to_string(),
            };
            tracing::warn!("⚠️ {}, nothing to store", err);
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Runs `process` on the blocking pool. The payload is moved in and the
/// result comes back exactly once on the returned channel.
pub struct ProcessingStage;

impl ProcessingStage {
    pub fn spawn(input: Value) -> oneshot::Receiver<Vec<NormalizedRecord>> {
        let (tx, rx) = oneshot::channel();

        tokio::task::spawn_blocking(move || {
            let output = process(input);
            tracing::debug!("Processing stage emitting {} records", output.len());
            if tx.send(output).is_err() {
                tracing::debug!("Coordinator dropped, processing result discarded");
            }
        });

        rx
    }
}
