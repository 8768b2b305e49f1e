use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    adapters::json::JsonPolicy,
    application::services::{ContentSniffer, TokenGenerator, UploadService},
    domain::config::local::ServerConfig,
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub upload_service: Arc<UploadService>,
    pub json_policy: JsonPolicy,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        token_generator: Arc<dyn TokenGenerator>,
        sniffer: Arc<dyn ContentSniffer>,
    ) -> Self {
        let json_policy = JsonPolicy {
            max_bytes: config.max_json_size,
            allow_unknown_fields: config.allow_unknown_json_fields,
        };

        Self {
            config: Arc::new(config),
            upload_service: Arc::new(UploadService::new(token_generator, sniffer)),
            json_policy,
            http_client: reqwest::Client::new(),
        }
    }
}
