//! ShareFlow relay server
//!
//! Main entry point for the ShareFlow backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shareflow_api::{AppState, create_router};
use shareflow_core::relay::{LogRanges, RelayService};
use shareflow_google::GoogleClients;
use shareflow_shared::{AppConfig, CredentialSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shareflow=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()
        .inspect_err(|e| error!(error = %e, "Failed to load configuration"))?;

    // Load service-account credentials
    let source = CredentialSource::from_env(&config.credentials.path)
        .inspect_err(|e| error!(error = %e, "No usable credential source"))?;
    let key = source
        .load()
        .inspect_err(|e| error!(source = source.kind(), error = %e, "Failed to load credentials"))?;
    info!(
        source = source.kind(),
        client_email = %key.client_email,
        "Loaded service-account credentials"
    );

    // Create Drive and Sheets clients
    let GoogleClients { drive, sheets } =
        shareflow_google::connect(&key, &config.drive, &config.sheets)
            .inspect_err(|e| error!(error = %e, "Failed to create Google clients"))?;
    info!(
        folder_id = %drive.folder_id(),
        spreadsheet_id = %sheets.spreadsheet_id(),
        "Google clients configured"
    );

    // Create application state
    let relay = RelayService::new(
        Arc::new(drive),
        Arc::new(sheets),
        LogRanges::from(&config.sheets),
    );
    let max_upload_bytes = usize::try_from(config.server.max_upload_bytes)
        .context("server.max_upload_bytes does not fit in memory")?;
    let state = AppState::new(relay, max_upload_bytes);

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .inspect_err(|e| error!(addr = %addr, error = %e, "Failed to bind"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down gracefully..."),
        () = terminate => info!("Received SIGTERM, shutting down gracefully..."),
    }
}
