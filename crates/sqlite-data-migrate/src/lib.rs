//! # sqlite-data-migrate
//!
//! Schema-tolerant data migration between SQLite database snapshots.
//!
//! Transplants application data from an "old" database into a
//! freshly-provisioned "new" database template, tolerating schema drift
//! (added, removed or reordered columns and tables) between versions:
//!
//! - **Catalog-driven**: tables and columns come from the database's own
//!   catalog, never a static schema file
//! - **Best-effort**: each table commits independently; one failing table
//!   never aborts the rest of the run
//! - **Structured outcome**: every source table is reported as copied,
//!   skipped or errored
//! - **Archive-aware**: snapshots wrapped in zip containers can be
//!   extracted and repackaged around a run
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use sqlite_data_migrate::migrate;
//!
//! fn main() -> sqlite_data_migrate::Result<()> {
//!     let outcome = migrate(Path::new("old.db"), Path::new("new.db"))?;
//!     println!("{}", outcome.summary());
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod identifier;
pub mod reconcile;
pub mod transfer;

// Re-exports for convenient access
pub use catalog::TableInfo;
pub use engine::{
    migrate, CopiedTable, ErroredTable, MigrationOutcome, Migrator, SkipReason, SkippedTable,
    DEFAULT_EXCLUDED_TABLES,
};
pub use error::{MigrateError, Result};
