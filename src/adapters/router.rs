use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{
    adapters::{
        controllers::{
            file_controller::FileController, health_controller::HealthController,
            slug_controller::SlugController,
        },
        state::AppState,
    },
    domain::config::local::ServerConfig,
};

pub fn create_router(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config);

    Router::new()
        .route("/api/v1/health", get(HealthController::health_check))
        .route("/api/v1/uploads", post(FileController::upload_files))
        .route("/api/v1/uploads/single", post(FileController::upload_one_file))
        .route("/api/v1/files/{name}", get(FileController::download_file))
        .route("/api/v1/slugs", post(SlugController::create_slug))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    match &config.cors_allowed_origins {
        Some(allowed_origins) => {
            let origins: Vec<HeaderValue> = allowed_origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        // Allow all origins if not specified (only for development)
        None => CorsLayer::permissive(),
    }
}
