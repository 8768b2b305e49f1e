use std::path::Path;

use axum::{
    body::Body,
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        StatusCode,
    },
    response::Response,
};
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::info;

use crate::application::error::ApplicationError;

/// Streams `dir/file_name` as an attachment named `display_name`.
pub async fn download_static_file(
    dir: &Path,
    file_name: &str,
    display_name: &str,
) -> Result<Response, ApplicationError> {
    if file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains(['/', '\\', '\0'])
    {
        return Err(ApplicationError::BadRequest("Invalid file name".to_string()));
    }

    let path = dir.join(file_name);
    let file = match fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApplicationError::NotFound)
        }
        Err(e) => {
            return Err(ApplicationError::InternalError(format!(
                "Failed to open {}: {}",
                path.display(),
                e
            )))
        }
    };

    let metadata = file
        .metadata()
        .await
        .map_err(|e| ApplicationError::InternalError(e.to_string()))?;
    if !metadata.is_file() {
        return Err(ApplicationError::NotFound);
    }

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let attachment_name: String = display_name
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();

    info!(file = %file_name, size_bytes = metadata.len(), "Serving static file");

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, mime.as_ref())
        .header(CONTENT_LENGTH, metadata.len())
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", attachment_name),
        )
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| ApplicationError::InternalError(format!("Failed to build response: {}", e)))
}
