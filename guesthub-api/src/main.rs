use std::net::SocketAddr;

use anyhow::Context;
use guesthub_api::{app, AppState};
use guesthub_core::repository::Repositories;
use guesthub_store::app_config::{Config, StoreBackend};
use guesthub_store::DbClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guesthub_api=debug,guesthub_core=info,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting GuestHub API on port {}", config.server.port);

    let repos = match config.database.backend {
        StoreBackend::Postgres => {
            let db = DbClient::new(&config.database.url, config.database.max_connections)
                .await
                .context("Failed to connect to Postgres")?;
            if config.database.run_migrations {
                db.migrate().await.context("Failed to run migrations")?;
            }
            db.repositories()
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Repositories::in_memory()
        }
    };

    let app = app(AppState::from_config(repos, &config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
