//! ECS service discovery server
//!
//! Discovers ECS service targets and exposes them to Prometheus as a
//! `file_sd` file and on the `/targets` HTTP endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecs_sd::{
    create_router, spawn_publisher, AppState, CachingEcsClient, Config, Discovery, EcsClient,
    FileSdWriter, HttpEcsClient, TtlCache,
};

/// Main entry point for the discovery server.
///
/// # Startup Sequence
/// 1. Load and validate configuration from environment variables
/// 2. Initialize tracing subscriber for logging
/// 3. Build the HTTP ECS client wrapped in the caching client
/// 4. Start the publisher and the discovery loop
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    // RUST_LOG overrides the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("ecs_sd={},tower_http=info", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        endpoint = %config.ecs_endpoint,
        refresh_interval_secs = config.refresh_interval.as_secs(),
        port = config.server_port,
        output_file = ?config.output_file,
        "Starting ECS service discovery"
    );

    if config.uses_aws_endpoint() {
        warn!(
            endpoint = %config.ecs_endpoint,
            "ECS requests are not signed; point ECS_SD_ENDPOINT at a signing proxy or emulator"
        );
    }

    let remote = HttpEcsClient::new(config.ecs_endpoint.clone(), config.request_timeout)
        .context("Failed to build ECS client")?;
    let cache = TtlCache::new(config.cache_config()).context("Failed to create response cache")?;
    let client: Arc<dyn EcsClient> =
        Arc::new(CachingEcsClient::new(Arc::new(remote), Arc::clone(&cache)));
    let discovery = Discovery::new(client, config.refresh_interval)
        .context("Failed to create discovery engine")?;

    let shutdown = CancellationToken::new();
    let (tx, rx) = mpsc::channel(1);
    let state = AppState::new(Arc::clone(&cache));

    let writer = config.output_file.clone().map(FileSdWriter::new);
    let publisher = spawn_publisher(rx, state.clone(), writer, shutdown.child_token());
    let engine = tokio::spawn(discovery.run(shutdown.child_token(), tx));

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .context("HTTP server failed")?;

    shutdown.cancel();
    engine.await.context("Discovery task panicked")?;
    publisher.await.context("Publisher task panicked")?;
    cache.close();

    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then cancels `shutdown`.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    shutdown.cancel();
}
