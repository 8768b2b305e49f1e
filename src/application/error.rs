use thiserror::Error;

/// Errors surfaced at the HTTP boundary.
#[derive(Debug)]
pub enum ApplicationError {
    NotFound,
    BadRequest(String),
    PayloadTooLarge(String),
    UnsupportedMediaType(String),
    InternalError(String),
}

/// Failures of a multipart ingestion call. Any of them aborts the whole call.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("malformed multipart request: {0}")]
    Parse(String),

    #[error("the uploaded data exceeds the maximum allowed size of {limit} bytes")]
    SizeLimitExceeded { limit: u64 },

    #[error("the uploaded file type {sniffed} is not permitted")]
    TypeRejected { sniffed: String },

    #[error("failed to store uploaded file: {0}")]
    Io(#[from] std::io::Error),

    #[error("expected exactly one uploaded file, received {0}")]
    CountMismatch(usize),
}

impl From<UploadError> for ApplicationError {
    fn from(error: UploadError) -> Self {
        match error {
            UploadError::Parse(_) | UploadError::CountMismatch(_) => {
                ApplicationError::BadRequest(error.to_string())
            }
            UploadError::SizeLimitExceeded { .. } => {
                ApplicationError::PayloadTooLarge(error.to_string())
            }
            UploadError::TypeRejected { .. } => {
                ApplicationError::UnsupportedMediaType(error.to_string())
            }
            UploadError::Io(e) => ApplicationError::InternalError(format!("Upload I/O error: {}", e)),
        }
    }
}
