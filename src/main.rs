// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use coffee_shop_api::{
    api::router,
    config::{AppConfig, LogFormat},
    state::AppState,
    storage::DrinkStore,
};

const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Time allowed for in-flight requests after Ctrl-C.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    init_tracing(LogFormat::from_env());

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let addr = config.bind_addr()?;

    let store = DrinkStore::open(&config.database_path)?;
    let verifier = config.auth.verifier()?;

    // Warm the key cache. Not fatal.
    if let Err(e) = verifier.jwks().refresh().await {
        tracing::warn!(error = %e, jwks_url = %config.auth.jwks_url, "Initial JWKS fetch failed");
    }

    let app = router(AppState::new(store, verifier));

    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received, starting graceful shutdown");
                shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "rustls crypto provider already installed")?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;

            tracing::info!(%addr, database = %config.database_path.display(), "Coffee shop API listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(%addr, database = %config.database_path.display(), "Coffee shop API listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}
