//! ticket-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints, and
//! the persistence tasks when a database is configured.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use ticket_gateway::api;
use ticket_gateway::app_state::AppState;
use ticket_gateway::config::GatewayConfig;
use ticket_gateway::domain::{EventBus, Store};
use ticket_gateway::persistence::{PostgresPersistence, tasks};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env().context("invalid LISTEN_ADDR")?;
    init_tracing(config.log_json);
    tracing::info!(addr = %config.listen_addr, "starting ticket-gateway");

    // Build domain layer
    let store = Arc::new(Store::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    let persistence = if config.persistence_enabled {
        connect_persistence(&config, &store, &event_bus).await
    } else {
        tracing::info!("persistence disabled, running in memory-only mode");
        None
    };

    let shutdown_persistence = persistence.clone();
    let app_state = AppState::new(&config, Arc::clone(&store), event_bus, persistence);
    let app = api::build_app(app_state, &config);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(persistence) = &shutdown_persistence {
        tasks::final_snapshot(persistence, &store).await;
    }

    tracing::info!("server shutdown complete");
    Ok(())
}

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Connects to PostgreSQL, restores the latest snapshot and starts the
/// journal and snapshot tasks. Returns `None` if the database is
/// unreachable; the gateway then keeps running without it.
async fn connect_persistence(
    config: &GatewayConfig,
    store: &Arc<Store>,
    event_bus: &EventBus,
) -> Option<PostgresPersistence> {
    let persistence = match PostgresPersistence::connect(config).await {
        Ok(persistence) => persistence,
        Err(err) => {
            tracing::warn!(error = %err, "database unreachable, running in memory-only mode");
            return None;
        }
    };

    if let Err(err) = tasks::restore_latest(&persistence, store).await {
        tracing::error!(error = %err, "snapshot restore failed, starting empty");
    }

    tasks::spawn_journal(persistence.clone(), event_bus);
    tasks::spawn_snapshots(
        persistence.clone(),
        Arc::clone(store),
        config.snapshot_interval_secs,
        config.cleanup_after_days,
    );
    tracing::info!(
        interval_secs = config.snapshot_interval_secs,
        "persistence enabled"
    );
    Some(persistence)
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::warn!("received Ctrl-C, shutting down"),
        () = terminate => tracing::warn!("received SIGTERM, shutting down"),
    }
}
