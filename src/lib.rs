//! HTTP request utilities centred on multipart upload ingestion: random
//! tokens, content sniffing, streaming uploads to disk, file downloads,
//! slugs, and JSON body helpers.

pub mod adapters;
pub mod application;
pub mod domain;
pub mod services;
