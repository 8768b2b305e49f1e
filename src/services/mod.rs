mod error;
mod infer_sniffer;
mod multer_source;
mod random_token;
mod remote_json;
mod slugify;

pub use error::RemoteError;
pub use infer_sniffer::{InferContentSniffer, OCTET_STREAM, TEXT_PLAIN_UTF8};
pub use multer_source::{MulterPart, MulterSource};
pub use random_token::OsTokenGenerator;
pub use remote_json::push_json_to_remote;
pub use slugify::{slugify, SlugError};
