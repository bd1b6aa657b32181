use axum::http::StatusCode;
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::models::{ErrorResponse, IngestRequest, IngestResponse, Reading};
use crate::state::AppState;

#[derive(Debug)]
pub struct ServiceError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ServiceError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code,
                message: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

/// Accepts only a JSON object; field types are checked by serde.
pub fn parse_request(body: Value) -> Result<IngestRequest, ServiceError> {
    if !body.is_object() {
        return Err(ServiceError::bad_request("request body must be a JSON object"));
    }
    serde_json::from_value(body)
        .map_err(|err| ServiceError::bad_request(format!("invalid request body: {err}")))
}

/// Ingest payload after validation.
#[derive(Debug)]
pub struct ValidReading {
    pub device_id: String,
    pub distance: f64,
    pub state: Value,
}

pub fn validate(
    payload: IngestRequest,
    device_id_max_len: usize,
) -> Result<ValidReading, ServiceError> {
    let device_id = payload
        .device_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ServiceError::bad_request("device_id is required"))?;
    // The id is the store key verbatim, so padded ids would alias distinct devices.
    if device_id.trim() != device_id {
        return Err(ServiceError::bad_request(
            "device_id must not have leading or trailing whitespace",
        ));
    }
    if device_id.chars().count() > device_id_max_len {
        return Err(ServiceError::bad_request(format!(
            "device_id exceeds {device_id_max_len} characters"
        )));
    }

    let distance = payload
        .distance
        .ok_or_else(|| ServiceError::bad_request("distance is required"))?;
    if !distance.is_finite() || distance < 0.0 {
        return Err(ServiceError::bad_request(
            "distance must be a finite, non-negative number",
        ));
    }

    Ok(ValidReading {
        device_id,
        distance,
        // Occupancy state is opaque; an omitted state is stored as null.
        state: payload.state.unwrap_or(Value::Null),
    })
}

pub async fn ingest(
    state: &AppState,
    payload: IngestRequest,
) -> Result<IngestResponse, ServiceError> {
    let valid = validate(payload, state.device_id_max_len)?;
    let device_id = valid.device_id.clone();
    let reading = state
        .devices
        .upsert(valid.device_id, valid.distance, valid.state, Utc::now())
        .await;

    tracing::info!("{}", reading.summary(&device_id));

    Ok(IngestResponse { status: "ok" })
}

pub async fn snapshot(state: &AppState) -> BTreeMap<String, Reading> {
    state.devices.snapshot().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;

    fn request(device_id: Option<&str>, distance: Option<f64>) -> IngestRequest {
        IngestRequest {
            device_id: device_id.map(str::to_string),
            distance,
            state: Some(Value::String("vacant".into())),
        }
    }

    #[test]
    fn rejects_missing_or_blank_device_id() {
        for device_id in [None, Some(""), Some("   ")] {
            let err = validate(request(device_id, Some(1.0)), 128).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.body.code, "bad_request");
        }
    }

    #[test]
    fn rejects_overlong_device_id() {
        let err = validate(request(Some("abcdef"), Some(1.0)), 5).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(validate(request(Some("abcde"), Some(1.0)), 5).is_ok());
    }

    #[test]
    fn rejects_missing_negative_or_non_finite_distance() {
        for distance in [None, Some(-0.5), Some(f64::NAN), Some(f64::INFINITY)] {
            let err = validate(request(Some("d1"), distance), 128).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn rejects_padded_device_id() {
        for device_id in [" d1", "d1 ", " d1 ", "d1\n"] {
            let err = validate(request(Some(device_id), Some(1.0)), 128).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn padded_id_does_not_overwrite_existing_device() {
        let state = AppState::new(&ServiceConfig::default());
        ingest(&state, request(Some("d1"), Some(12.5))).await.unwrap();
        assert!(ingest(&state, request(Some(" d1 "), Some(99.0))).await.is_err());

        let devices = snapshot(&state).await;
        assert_eq!(devices.len(), 1);
        assert_eq!(devices["d1"].distance, 12.5);
    }

    #[test]
    fn keeps_device_id_verbatim_and_defaults_state_to_null() {
        let valid = validate(
            IngestRequest {
                device_id: Some("P1-1".into()),
                distance: Some(0.0),
                state: None,
            },
            128,
        )
        .unwrap();
        assert_eq!(valid.device_id, "P1-1");
        assert_eq!(valid.distance, 0.0);
        assert_eq!(valid.state, Value::Null);
    }

    #[test]
    fn parse_rejects_non_objects_and_wrong_types() {
        for body in [
            serde_json::json!(["d1", 12.5, "vacant"]),
            serde_json::json!("d1"),
            serde_json::json!({"device_id": "d1", "distance": "twelve"}),
            serde_json::json!({"device_id": 7, "distance": 1.0}),
        ] {
            let err = parse_request(body).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn parse_accepts_any_state_shape() {
        let parsed = parse_request(serde_json::json!({
            "device_id": "d1",
            "distance": 12,
            "state": {"vacant": true}
        }))
        .unwrap();
        assert_eq!(parsed.distance, Some(12.0));
        assert_eq!(parsed.state, Some(serde_json::json!({"vacant": true})));
    }

    #[tokio::test]
    async fn rejected_ingest_leaves_store_untouched() {
        let state = AppState::new(&ServiceConfig::default());
        assert!(ingest(&state, request(Some("d1"), Some(-1.0))).await.is_err());
        assert!(snapshot(&state).await.is_empty());
    }

    #[tokio::test]
    async fn sequential_ingests_have_non_decreasing_timestamps() {
        let state = AppState::new(&ServiceConfig::default());
        let mut last = None;
        for distance in [10.0, 20.0, 30.0] {
            let response = ingest(&state, request(Some("d1"), Some(distance))).await;
            assert_eq!(response.ok().map(|r| r.status), Some("ok"));
            let timestamp = snapshot(&state).await["d1"].timestamp;
            if let Some(previous) = last {
                assert!(timestamp >= previous);
            }
            last = Some(timestamp);
        }
        assert_eq!(snapshot(&state).await["d1"].distance, 30.0);
    }
}
