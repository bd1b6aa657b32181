use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /data`. Every field is optional at the wire level so that
/// missing fields surface as validation errors rather than parse errors.
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub device_id: Option<String>,
    pub distance: Option<f64>,
    pub state: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
}

/// Latest reading for one device, as stored and as returned by `GET /devices`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub distance: f64,
    pub state: Value,
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    /// One-line operator summary, e.g. `[2024-05-01T10:00:00Z] d1: 12.50 cm | state: vacant`.
    pub fn summary(&self, device_id: &str) -> String {
        let state = match &self.state {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        format!(
            "[{}] {}: {:.2} cm | state: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            device_id,
            self.distance,
            state
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}
