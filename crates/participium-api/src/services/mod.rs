pub mod cleanup;
pub mod upload;

pub use cleanup::CleanupService;
pub use upload::UploadService;
