use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use harvest_core::HarvestConfig;
use harvest_core::scheduler::{Scheduler, TracingSweepReporter};
use harvest_core::seed::seed_default_sources;
use harvest_db::{Database, DatabaseConfig};
use harvest_server::config::ServerConfig;
use harvest_server::routes;
use harvest_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("harvest=info".parse()?))
        .with_target(false)
        .init();

    let server_config = ServerConfig::from_env()?;
    let harvest_config = HarvestConfig::from_env()?;
    let addr = format!("0.0.0.0:{}", server_config.port);

    let db = Database::connect(&DatabaseConfig::from_env()?).await?;
    db.migrate().await?;

    let seeded = seed_default_sources(&db.source_repo()).await?;
    if seeded > 0 {
        tracing::info!(seeded, "Seeded default sources");
    }

    let state = Arc::new(AppState::new(db.clone(), &harvest_config)?);

    let cancel = CancellationToken::new();
    let scheduler_handle = if server_config.scheduler_enabled {
        let scheduler = Scheduler::new(
            state.fetcher.clone(),
            db.source_repo(),
            db.posting_repo(),
            harvest_config.sweep_interval,
        );
        let cancel = cancel.clone();
        Some(tokio::spawn(async move {
            scheduler.run(cancel, &TracingSweepReporter).await;
        }))
    } else {
        tracing::info!("Background sweep disabled");
        None
    };

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    if let Some(handle) = scheduler_handle {
        tracing::info!("Waiting for the current sweep to finish");
        handle.await?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
