//! Lattice gas simulation server.
//!
//! Runs the tick scheduler in the background and exposes controls and the
//! latest frame over HTTP.

mod api;
mod controls;
mod scheduler;
mod telemetry;

use anyhow::Result;
use lattice_core::AppConfig;
use lattice_world::{Session, SnapshotRenderer};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = match std::env::var("LATTICE_CONFIG") {
        Ok(path) => AppConfig::load(path)?,
        Err(_) => AppConfig::default(),
    };

    // Initialize telemetry
    telemetry::init_telemetry(config.server.otel_endpoint.as_deref())?;

    info!(
        "Starting lattice server on {}:{}",
        config.server.bind_address, config.server.port
    );

    let session = Session::new(&config.grid, &config.engine);
    let controls = Arc::new(controls::Controls::new(&config.controls));
    let frames = SnapshotRenderer::new();
    let cancel = CancellationToken::new();

    // Start tick scheduler
    let scheduler = tokio::spawn(scheduler::run_scheduler(
        session,
        controls.clone(),
        frames.clone(),
        config.scheduler.clone(),
        cancel.clone(),
    ));

    let app = api::router(api::AppState {
        controls,
        frames,
        render_config: config.render.clone(),
        started_at: chrono::Utc::now(),
    });

    // Start server
    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server listening on {}", addr);

    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.cancel();
        })
        .await?;

    cancel.cancel();
    let ticks = scheduler.await?;
    info!(ticks = ticks, "Scheduler stopped");

    // Shutdown telemetry
    telemetry::shutdown_telemetry();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
