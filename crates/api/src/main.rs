use anyhow::Result;
use std::time::Duration;
use tracing::info;

use ticket_desk_api::app::{build_store, create_router, AppState};
use ticket_desk_api::config::Config;
use ticket_desk_api::jobs::{
    JobScheduler, PoolMetricsJob, PruneLoginLimiterJob, PurgeDeletedTicketsJob,
};
use ticket_desk_api::middleware::{init_metrics, logging::init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging)?;
    init_metrics()?;

    info!("Starting Ticket Desk API v{}", env!("CARGO_PKG_VERSION"));

    let (store, pool) = build_store(&config).await?;
    let addr = config.socket_addr()?;
    let retention = config.retention.clone();

    let state = AppState::new(config, store.clone());

    let mut scheduler = JobScheduler::new();
    if let Some(store) = store {
        if retention.deleted_ticket_days > 0 {
            scheduler.register(PurgeDeletedTicketsJob::new(
                store,
                retention.deleted_ticket_days,
                retention.purge_interval_minutes,
            ));
        } else {
            info!("Trash retention disabled");
        }
    }
    if let Some(pool) = pool {
        scheduler.register(PoolMetricsJob::new(pool));
    }
    if let Some(limiter) = state.login_limiter.clone() {
        scheduler.register(PruneLoginLimiterJob::new(limiter));
    }
    scheduler.start();

    let app = create_router(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
