pub mod officers;
pub mod photo_upload;
pub mod reports;
pub mod telegram;
