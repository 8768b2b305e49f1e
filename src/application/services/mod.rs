pub mod content_sniffer;
pub mod multipart_source;
pub mod token_generator;
pub mod upload_service;

pub use content_sniffer::{ContentSniffer, SNIFF_LEN};
pub use multipart_source::{MultipartSource, UploadPart};
pub use token_generator::{TokenGenerator, ALPHABET};
pub use upload_service::{create_dir_if_not_exists, UploadService, RANDOM_NAME_LENGTH};
