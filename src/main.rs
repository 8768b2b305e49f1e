use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use upload_toolkit::{
    adapters::{router::create_router, state::AppState},
    application::services::{create_dir_if_not_exists, ContentSniffer, TokenGenerator},
    domain::config::local::ServerConfig,
    services::{InferContentSniffer, OsTokenGenerator},
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env().expect("ERROR: invalid configuration");

    tracing::info!(
        upload_dir = %config.upload_dir.display(),
        static_dir = %config.static_dir.display(),
        allowed_file_types = ?config.allowed_file_types,
        max_upload_size = config.max_upload_size,
        "Starting upload-toolkit"
    );

    create_dir_if_not_exists(&config.upload_dir)
        .await
        .expect("ERROR: failed to create upload directory");

    let port = config.port;
    let app_state = AppState::new(
        config,
        Arc::new(OsTokenGenerator) as Arc<dyn TokenGenerator>,
        Arc::new(InferContentSniffer) as Arc<dyn ContentSniffer>,
    );
    let router = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind to port");

    tracing::info!("Server listening on 0.0.0.0:{}", port);

    axum::serve(listener, router)
        .await
        .expect("Failed to start server");
}
