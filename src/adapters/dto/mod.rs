pub mod slug_dto;
pub mod upload_dto;
