use async_trait::async_trait;
use bytes::Bytes;

use crate::application::error::UploadError;

/// A parsed multipart/form-data body yielding its parts in wire order.
///
/// A part must be dropped before the next one is requested.
#[async_trait]
pub trait MultipartSource: Send {
    type Part: UploadPart;

    async fn next_part(&mut self) -> Result<Option<Self::Part>, UploadError>;
}

/// One part of a multipart body, read incrementally.
#[async_trait]
pub trait UploadPart: Send {
    fn field_name(&self) -> Option<&str>;

    /// Client-declared file name. `None` means the part is a plain form field.
    fn file_name(&self) -> Option<&str>;

    /// Client-declared `Content-Type`. Informational only.
    fn declared_content_type(&self) -> Option<&str>;

    /// Next chunk of the part body, `None` once the part is exhausted.
    async fn chunk(&mut self) -> Result<Option<Bytes>, UploadError>;
}
