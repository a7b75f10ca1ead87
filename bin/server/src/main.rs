mod config;
mod constants;
mod handlers;
mod progress;
mod state;

use actix_web::{web, App, HttpServer};
use config::ServerConfig;
use relay::{HttpFileHost, Relay};
use state::AppState;
use std::sync::Arc;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing with env filter
    // Filter out actix-server worker shutdown messages
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "info,actix_server::worker=warn,actix_server::accept=warn",
                )
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting file relay server (PID: {})", std::process::id());

    let config = ServerConfig::load().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    // A malformed record file is fatal; the server never starts over it
    let store = config.storage_backend().initialize().await.map_err(|e| {
        error!("Failed to initialize record storage: {:#}", e);
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to initialize record storage: {:#}", e),
        )
    })?;
    info!(
        storage = ?config.storage_type,
        records_file = ?config.records_file,
        records = store.len().await.unwrap_or(0),
        "Record storage initialized"
    );

    let host = HttpFileHost::new(config.file_host_url.clone(), config.file_host_timeout)
        .map_err(|e| {
            error!("Failed to build file host client: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?;
    info!(
        file_host = %config.file_host_url,
        timeout_secs = config.file_host_timeout.as_secs(),
        max_upload_size = config.max_upload_size,
        "File host configured"
    );

    let relay = Relay::new(store, Arc::new(host), config.max_upload_size);
    let state = web::Data::new(AppState::new(relay, config.base_url.clone()));
    let max_upload_size = config.max_upload_size;
    let bind_address = config.bind_address();

    info!("Starting server on http://{}", bind_address);
    info!("Share links use base URL {}", config.base_url);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(handlers::upload_form::multipart_config(max_upload_size))
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .map_err(|e| {
        error!("Failed to bind to {}: {}", bind_address, e);
        e
    })?;

    info!("Server bound successfully to http://{}", bind_address);

    server.run().await
}
