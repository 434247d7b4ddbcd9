//! Participium data access layer.
//!
//! Repositories over PostgreSQL via sqlx. Each repository owns one domain
//! entity and provides CRUD operations and the specialized queries the API
//! layer needs (offset accounting for photos, load-balanced officer
//! selection for reports).

pub mod db;

pub use db::officer::OfficerRepository;
pub use db::photo::PhotoRepository;
pub use db::report::{NewReport, ReportRepository};
pub use db::telegram::TelegramRepository;
