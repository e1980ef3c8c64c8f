//! HTTP server initialization and lifecycle.
//!
//! Handles the database pool, migrations, the click pipeline, the gauge
//! task and the ordered shutdown sequence.

use crate::application::gauges::spawn_gauge_refresh;
use crate::config::Config;
use crate::domain::click_worker::{Drain, shutdown_requested, spawn_click_pipeline};
use crate::infrastructure::database::Database;
use crate::infrastructure::persistence::SqlClickRepository;
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::ip_hash::IpHasher;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Connection pool for the configured dialect
/// - Forward-only migrations
/// - Background click worker
/// - Gauge refresh task
/// - Axum HTTP server
///
/// On SIGINT or SIGTERM the server stops accepting connections, the gauge
/// task stops, the click queue closes and is drained for at most
/// `SHUTDOWN_DRAIN_SECONDS`, and whatever is still serving is aborted.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - The server exits with an error before a shutdown signal
pub async fn run(config: Config) -> Result<()> {
    let db = Database::connect(&config.database_url, config.dialect, &config.pool_settings())
        .await
        .context("Failed to connect to database")?;
    info!(dialect = %db.dialect(), "Connected to database");

    db.migrate().await.context("Failed to apply migrations")?;
    info!("Migrations applied");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let click_repository = Arc::new(SqlClickRepository::new(&db));
    let (click_sender, click_worker) = spawn_click_pipeline(
        click_repository,
        config.click_queue_capacity,
        shutdown_rx.clone(),
    );
    info!(capacity = config.click_queue_capacity, "Click worker started");

    let state = AppState::new(
        db.clone(),
        click_sender.clone(),
        IpHasher::new(&config.ip_hash_secret),
    );

    let gauges = spawn_gauge_refresh(
        state.link_service.clone(),
        click_sender,
        config.gauge_refresh(),
        shutdown_rx.clone(),
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{addr}");

    let mut stop_accepting = shutdown_rx;
    let mut server = tokio::spawn(async move {
        axum::serve(
            listener,
            ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
        )
        .with_graceful_shutdown(async move { shutdown_requested(&mut stop_accepting).await })
        .await
    });

    let early_exit = tokio::select! {
        () = shutdown_signal() => {
            info!("Shutdown signal received");
            None
        }
        result = &mut server => Some(result),
    };

    // Stops the listener, the gauge task and the click queue together.
    let _ = shutdown_tx.send(true);

    if let Err(e) = gauges.await {
        warn!(error = %e, "Gauge task ended abnormally");
    }

    match click_worker.join(config.shutdown_drain()).await {
        Drain::Drained(stats) => info!(
            persisted = stats.persisted,
            failed = stats.failed,
            dropped_full = stats.dropped_full,
            dropped_closed = stats.dropped_closed,
            "Click queue drained"
        ),
        Drain::TimedOut(stats) => error!(
            in_flight = stats.in_flight(),
            persisted = stats.persisted,
            "Click drain timed out after {}s, remaining events lost",
            config.shutdown_drain_seconds
        ),
        Drain::Crashed(stats) => error!(
            in_flight = stats.in_flight(),
            "Click worker crashed before draining"
        ),
    }

    let served = match early_exit {
        Some(result) => result,
        None => {
            if !server.is_finished() {
                warn!("Aborting connections still open after drain");
                server.abort();
            }
            Ok(Ok(()))
        }
    };

    db.close().await;
    info!("Shutdown complete");

    match served {
        Ok(result) => result.context("HTTP server failed"),
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => Err(e).context("HTTP server task panicked"),
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
