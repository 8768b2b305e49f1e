pub mod file_controller;
pub mod health_controller;
pub mod slug_controller;
