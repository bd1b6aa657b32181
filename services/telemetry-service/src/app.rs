use std::any::Any;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{devices, healthz, ingest, readyz};
use crate::service::ServiceError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/data", post(ingest))
        .route("/devices", get(devices));

    with_layers(routes).with_state(state)
}

fn with_layers(routes: Router<AppState>) -> Router<AppState> {
    // Dashboards poll from arbitrary origins (phones on the LAN).
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    routes
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|text| text.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!(panic = %detail, "handler panicked");

    let err = ServiceError::internal("internal server error");
    (err.status, Json(err.body)).into_response()
}
