//! Photo byte storage for Participium.
//!
//! Defines the [`Storage`] trait used by the upload pipeline and the local
//! filesystem backend. Keys are flat, client-derived identifiers validated
//! against path traversal; bytes are written incrementally at offsets as
//! resumable uploads progress.

mod local;
mod traits;

pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
