pub mod local;
pub mod upload_policy;
