use async_trait::async_trait;
use axum::{extract::Request, http::header::CONTENT_TYPE};
use bytes::Bytes;
use futures_util::Stream;

use crate::application::{
    error::UploadError,
    services::{MultipartSource, UploadPart},
};

/// `multer`-backed multipart reader. The whole body is capped at the byte
/// limit it was built with.
pub struct MulterSource {
    multipart: multer::Multipart<'static>,
    limit: u64,
}

impl MulterSource {
    /// Reads the boundary from the request's `Content-Type` and wraps its body.
    pub fn from_request(request: Request, max_bytes: u64) -> Result<Self, UploadError> {
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| UploadError::Parse("missing Content-Type header".to_string()))?;

        let boundary = multer::parse_boundary(content_type)
            .map_err(|e| UploadError::Parse(e.to_string()))?;

        Ok(Self::new(
            request.into_body().into_data_stream(),
            boundary,
            max_bytes,
        ))
    }

    pub fn new<S, O, E>(stream: S, boundary: impl Into<String>, max_bytes: u64) -> Self
    where
        S: Stream<Item = Result<O, E>> + Send + 'static,
        O: Into<Bytes> + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
    {
        let constraints = multer::Constraints::new()
            .size_limit(multer::SizeLimit::new().whole_stream(max_bytes));

        Self {
            multipart: multer::Multipart::with_constraints(stream, boundary, constraints),
            limit: max_bytes,
        }
    }
}

#[async_trait]
impl MultipartSource for MulterSource {
    type Part = MulterPart;

    async fn next_part(&mut self) -> Result<Option<MulterPart>, UploadError> {
        let limit = self.limit;
        let field = self
            .multipart
            .next_field()
            .await
            .map_err(|e| upload_error(e, limit))?;

        Ok(field.map(|field| MulterPart { field, limit }))
    }
}

pub struct MulterPart {
    field: multer::Field<'static>,
    limit: u64,
}

#[async_trait]
impl UploadPart for MulterPart {
    fn field_name(&self) -> Option<&str> {
        self.field.name()
    }

    fn file_name(&self) -> Option<&str> {
        self.field.file_name()
    }

    fn declared_content_type(&self) -> Option<&str> {
        self.field.content_type().map(|mime| mime.essence_str())
    }

    async fn chunk(&mut self) -> Result<Option<Bytes>, UploadError> {
        let limit = self.limit;
        self.field
            .chunk()
            .await
            .map_err(|e| upload_error(e, limit))
    }
}

fn upload_error(error: multer::Error, limit: u64) -> UploadError {
    match error {
        multer::Error::StreamSizeExceeded { .. } | multer::Error::FieldSizeExceeded { .. } => {
            UploadError::SizeLimitExceeded { limit }
        }
        multer::Error::StreamReadFailed(e) => UploadError::Io(std::io::Error::other(e)),
        other => UploadError::Parse(other.to_string()),
    }
}
