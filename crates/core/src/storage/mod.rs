//! Tenant blob storage using Apache OpenDAL.
//!
//! Every tenant owns one `files/` directory holding one blob per file id.
//! Writes are staged in a sibling directory and renamed into place, so a
//! reader never observes a partially written blob.
//!
//! ```text
//! <tenant>/
//! ├── box.db
//! ├── .staging/        in-flight writes
//! └── files/
//!     ├── <file id>
//!     └── <file id>
//! ```

mod error;
mod service;

pub use error::StorageError;
pub use service::{BlobStore, FILES_DIR, STAGING_DIR};
