//! Product catalog: spreadsheet loading and read-side queries.
//!
//! One CSV file per category in a configured data directory; the file stem is
//! the category name. Everything is recomputed from source on every call;
//! there is no cache and no invalidation logic.

pub mod loader;
pub mod query;
pub mod record;

pub use query::{available_sizes, CatalogService};
pub use record::ProductRecord;

use std::path::PathBuf;

/// Errors surfaced by catalog reads.
///
/// Row- and file-level parse problems are logged and skipped inside the
/// loader; these variants cover the cases a caller must handle.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("category not found: {0}")]
    CategoryNotFound(String),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("spreadsheet error at {path:?}: {source}")]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
