//! Error types for the migration library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for migration operations.
///
/// Variants fall into two tiers. Fatal errors (`Open`, `Catalog`, `Io`,
/// `Zip`, `DatabaseNotFound`, `Cancelled`) abort the run and propagate to
/// the caller. Per-table errors (`Introspection`, `Transfer`) are caught at
/// the table-processing boundary and folded into the
/// [`MigrationOutcome`](crate::MigrationOutcome) instead of being re-raised.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Database file could not be opened.
    #[error("Cannot open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Table enumeration query against sqlite_master failed.
    #[error("Catalog query failed: {0}")]
    Catalog(#[from] rusqlite::Error),

    /// Structural introspection failed for a specific table.
    ///
    /// Typically the table vanished between enumeration and the
    /// `PRAGMA table_info` call (concurrent schema change).
    #[error("Schema introspection failed for table {table}: {message}")]
    Introspection { table: String, message: String },

    /// Data transfer failed for a specific table (select, insert or commit).
    #[error("Transfer failed for table {table}: {message}")]
    Transfer { table: String, message: String },

    /// Identifier failed validation (empty, null byte, overlong).
    #[error("Invalid identifier: {0}")]
    Identifier(String),

    /// No database file was found inside an extracted directory tree.
    #[error("No database file found under {0}")]
    DatabaseNotFound(PathBuf),

    /// User dismissed the interactive file selection.
    #[error("File selection cancelled")]
    Cancelled,

    /// IO error (file operations, archive extraction targets).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive container error.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON serialization error (outcome report).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create an Introspection error for a table.
    pub fn introspection(table: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Introspection {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a Transfer error for a table.
    pub fn transfer(table: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Transfer {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Whether this error is recoverable at the per-table boundary.
    ///
    /// Recoverable errors become `errored` outcome entries; everything else
    /// aborts the run.
    pub fn is_per_table(&self) -> bool {
        matches!(
            self,
            MigrateError::Introspection { .. } | MigrateError::Transfer { .. }
        )
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Cancelled => 2,
            _ => 1,
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
