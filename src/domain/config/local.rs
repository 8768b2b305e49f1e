use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::config::upload_policy::{UploadPolicy, DEFAULT_MAX_FILE_SIZE};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_JSON_SIZE: u64 = 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Process-level settings, read once at startup.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(rename = "uploadDir")]
    pub upload_dir: PathBuf,
    #[serde(rename = "staticDir")]
    pub static_dir: PathBuf,
    #[serde(rename = "allowedFileTypes")]
    pub allowed_file_types: Vec<String>,
    #[serde(rename = "maxUploadSize")]
    pub max_upload_size: u64,
    #[serde(rename = "maxJsonSize")]
    pub max_json_size: u64,
    #[serde(rename = "allowUnknownJsonFields")]
    pub allow_unknown_json_fields: bool,
    #[serde(rename = "renameUploads")]
    pub rename_uploads: bool,
    #[serde(rename = "uploadWebhookUrl")]
    pub upload_webhook_url: Option<String>,
    #[serde(rename = "corsAllowedOrigins")]
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from("./uploads"),
            static_dir: PathBuf::from("./static"),
            allowed_file_types: Vec::new(),
            max_upload_size: DEFAULT_MAX_FILE_SIZE,
            max_json_size: DEFAULT_MAX_JSON_SIZE,
            allow_unknown_json_fields: false,
            rename_uploads: true,
            upload_webhook_url: None,
            cors_allowed_origins: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup. Unset or
    /// blank variables fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(v) => v.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                expected: "a valid u16",
                value: v,
            })?,
            None => defaults.port,
        };

        Ok(Self {
            port,
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            allowed_file_types: get("ALLOWED_FILE_TYPES")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            max_upload_size: parse_u64(get("MAX_UPLOAD_SIZE"), "MAX_UPLOAD_SIZE")?
                .unwrap_or(defaults.max_upload_size),
            max_json_size: parse_u64(get("MAX_JSON_SIZE"), "MAX_JSON_SIZE")?
                .unwrap_or(defaults.max_json_size),
            allow_unknown_json_fields: parse_bool(
                get("ALLOW_UNKNOWN_JSON_FIELDS"),
                "ALLOW_UNKNOWN_JSON_FIELDS",
            )?
            .unwrap_or(defaults.allow_unknown_json_fields),
            rename_uploads: parse_bool(get("RENAME_UPLOADS"), "RENAME_UPLOADS")?
                .unwrap_or(defaults.rename_uploads),
            upload_webhook_url: get("UPLOAD_WEBHOOK_URL"),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS").map(|v| split_list(&v)),
        })
    }

    /// Upload rules handed to the ingestion engine for a single request.
    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::new(self.allowed_file_types.clone(), Some(self.max_upload_size))
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_u64(value: Option<String>, name: &'static str) -> Result<Option<u64>, ConfigError> {
    value
        .map(|v| {
            v.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name,
                expected: "a non-negative integer",
                value: v,
            })
        })
        .transpose()
}

fn parse_bool(value: Option<String>, name: &'static str) -> Result<Option<bool>, ConfigError> {
    value
        .map(|v| match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name,
                expected: "a boolean",
                value: v,
            }),
        })
        .transpose()
}
