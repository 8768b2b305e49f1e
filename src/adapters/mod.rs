pub mod controllers;
pub mod download;
pub mod dto;
pub mod error;
pub mod json;
pub mod router;
pub mod state;
