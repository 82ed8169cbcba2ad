//! Identity-isolated tenant storage.
//!
//! Each identity owns a directory under the data directory:
//!
//! ```text
//! <data_dir>/<identity dir>/box.db      SQLite records
//! <data_dir>/<identity dir>/files/<id>  one blob per file
//! <data_dir>/<identity dir>/.staging/   in-progress blob writes
//! ```
//!
//! [`TenantRegistry`] creates that storage lazily and caches one
//! [`TenantHandle`] per identity. Requests open their own
//! [`TenantConnection`] from the handle and close it when done.

mod connection;
mod error;
mod handle;
mod registry;
mod reset;

pub use connection::TenantConnection;
pub use error::TenantError;
pub use handle::{ConnectionSettings, DATABASE_FILE, TenantHandle};
pub use registry::TenantRegistry;
pub use reset::ResetSummary;
