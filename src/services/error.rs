use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Failed to encode payload: {0}")]
    EncodeError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            RemoteError::NetworkError("Request timeout".to_string())
        } else if error.is_connect() {
            RemoteError::NetworkError(format!("Connection failed: {}", error))
        } else if error.is_builder() || error.is_body() {
            RemoteError::EncodeError(error.to_string())
        } else {
            RemoteError::InternalError(error.to_string())
        }
    }
}
