mod config;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use agora_api::AppStateInner;
use agora_engine::Engine;
use agora_simulator::{Simulator, TracingLogger};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agora=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let (engine, _tasks) = Engine::start(config.request_timeout);

    let app = agora_api::router(AppStateInner::new(engine.clone()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    // The process ends when the simulation does.
    if let Some(sim_config) = config.simulation {
        info!(
            users = sim_config.users,
            duration_secs = sim_config.duration.as_secs(),
            "starting simulation"
        );
        let simulator = Simulator::new(engine.clone(), sim_config).with_logger(Arc::new(TracingLogger));
        let cancel = shutdown.child_token();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let stats = simulator.run(cancel).await;
            info!(?stats, "simulation complete");
            shutdown.cancel();
        });
    }

    info!("Agora server listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
