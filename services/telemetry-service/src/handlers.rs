use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use crate::service::{self, ServiceError};
use crate::state::AppState;

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn readyz() -> StatusCode {
    StatusCode::OK
}

pub async fn ingest(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let result = match body {
        Ok(Json(body)) => match service::parse_request(body) {
            Ok(payload) => service::ingest(&state, payload).await,
            Err(err) => Err(err),
        },
        Err(rejection) => Err(ServiceError::bad_request(rejection.body_text())),
    };

    match result {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            tracing::warn!(code = err.body.code, message = %err.body.message, "ingest rejected");
            (err.status, Json(err.body)).into_response()
        }
    }
}

pub async fn devices(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = service::snapshot(&state).await;
    (StatusCode::OK, Json(snapshot))
}
