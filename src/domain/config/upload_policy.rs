use serde::{Deserialize, Serialize};

/// Size cap applied when the caller does not set one (1 GiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// Per-call upload rules. Supplied by the caller and never mutated by the
/// ingestion engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    /// Accepted sniffed MIME types. Empty means any type is accepted.
    #[serde(rename = "allowedFileTypes", default)]
    pub allowed_file_types: Vec<String>,
    /// Maximum number of bytes read for one upload request.
    #[serde(rename = "maxFileSize", default)]
    pub max_file_size: Option<u64>,
}

impl UploadPolicy {
    pub fn new(allowed_file_types: Vec<String>, max_file_size: Option<u64>) -> Self {
        Self {
            allowed_file_types,
            max_file_size,
        }
    }

    /// Effective byte cap for a request.
    pub fn max_bytes(&self) -> u64 {
        self.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }

    /// Whether a sniffed content type passes the allow-list.
    ///
    /// Matching is case-insensitive and accepts either the full sniffed value
    /// or its essence without parameters, so `text/plain` admits
    /// `text/plain; charset=utf-8`.
    pub fn permits(&self, sniffed: &str) -> bool {
        if self.allowed_file_types.is_empty() {
            return true;
        }

        let essence = mime_essence(sniffed);
        self.allowed_file_types.iter().any(|allowed| {
            let allowed = allowed.trim();
            allowed.eq_ignore_ascii_case(sniffed.trim()) || allowed.eq_ignore_ascii_case(essence)
        })
    }
}

/// Strips parameters from a MIME type (`text/plain; charset=utf-8` -> `text/plain`).
pub fn mime_essence(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .unwrap_or(content_type)
}
