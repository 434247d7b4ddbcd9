//! Domain models shared across crates.

pub mod officer;
pub mod photo;
pub mod report;

pub use officer::Officer;
pub use photo::Photo;
pub use report::{Category, Report, ReportStatus};
