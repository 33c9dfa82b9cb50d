mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use invoicer_api::auth::{AppState, AppStateInner, Credentials};
use invoicer_crypto::CsrfService;
use invoicer_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invoicer=debug,invoicer_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    if config.uses_default_password() {
        warn!("INVOICER_AUTH_PASSWORD is unset, using the built-in default");
    }

    // The signing key lives for the whole process.
    let csrf = match &config.csrf_key {
        Some(key) => CsrfService::from_base64(key).context("invalid INVOICER_CSRF_KEY")?,
        None => CsrfService::generate(),
    };

    let db = Database::open(&config.db_path)?;

    let state: AppState = Arc::new(AppStateInner {
        db,
        csrf,
        credentials: Credentials::new(config.auth_user, config.auth_password),
    });

    let app = invoicer_api::router(state, &config.statics_dir);

    info!("Invoicer listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
