mod app;
mod config;
mod handlers;
mod models;
mod service;
mod state;

use spinet_common::{bind_listener, init_tracing, shutdown_signal};

use crate::config::ServiceConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let _guards = init_tracing("telemetry-service");

    let config = ServiceConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        device_id_max_len = config.device_id_max_len,
        "starting telemetry service"
    );

    // Readings live only in memory and are lost on restart.
    let state = AppState::new(&config);

    let app = app::build_router(state);
    let listener = bind_listener(config.host, config.port).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}
