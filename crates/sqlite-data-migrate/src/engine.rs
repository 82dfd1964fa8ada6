//! Migration engine - drives the per-table copy loop and builds the outcome.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog;
use crate::error::{MigrateError, Result};
use crate::reconcile;
use crate::transfer;

/// Framework bookkeeping tables that are never migrated, regardless of
/// schema compatibility.
pub const DEFAULT_EXCLUDED_TABLES: &[&str] = &["room_master_table"];

/// Why a table was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The table is in the excluded set.
    Excluded,
    /// No column name is shared with the destination table (or the
    /// destination table does not exist).
    NoMatchingColumns,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Excluded => write!(f, "excluded internal table"),
            SkipReason::NoMatchingColumns => write!(f, "no matching columns"),
        }
    }
}

/// A table whose rows were migrated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopiedTable {
    pub table: String,
    pub rows: i64,
}

/// A table that was not touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedTable {
    pub table: String,
    pub reason: SkipReason,
}

/// A table whose transfer failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErroredTable {
    pub table: String,
    pub error: String,
}

/// Result of a migration run.
///
/// Partitions the source table inventory: every discovered source table
/// appears in exactly one of `copied`, `skipped` or `errored`, in
/// source-enumeration order within each bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationOutcome {
    /// When the migration started.
    pub started_at: DateTime<Utc>,

    /// When the migration completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Total tables discovered in the source.
    pub tables_total: usize,

    /// Tables migrated, with per-table row counts.
    pub copied: Vec<CopiedTable>,

    /// Tables skipped, with reasons.
    pub skipped: Vec<SkippedTable>,

    /// Tables that failed, with captured error text.
    pub errored: Vec<ErroredTable>,
}

impl MigrationOutcome {
    /// Total rows migrated across all copied tables.
    pub fn rows_copied(&self) -> i64 {
        self.copied.iter().map(|t| t.rows).sum()
    }

    /// Whether the run completed without any errored table.
    pub fn is_clean(&self) -> bool {
        self.errored.is_empty()
    }

    /// Convert to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable aggregate summary (counts and names per bucket).
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Migration summary");
        let _ = writeln!(
            out,
            "  Copied:  {} tables, {} rows",
            self.copied.len(),
            self.rows_copied()
        );
        for t in &self.copied {
            let _ = writeln!(out, "    {} ({} rows)", t.table, t.rows);
        }
        let _ = writeln!(out, "  Skipped: {} tables", self.skipped.len());
        for t in &self.skipped {
            let _ = writeln!(out, "    {} ({})", t.table, t.reason);
        }
        let _ = writeln!(out, "  Errored: {} tables", self.errored.len());
        for t in &self.errored {
            let _ = writeln!(out, "    {}: {}", t.table, t.error);
        }
        let _ = writeln!(out, "  Duration: {:.2}s", self.duration_seconds);
        out
    }
}

/// How a single table fared inside the per-table boundary.
enum TableDisposition {
    Copied(i64),
    NoMatchingColumns,
}

/// Schema-tolerant migration engine.
///
/// Copies rows table by table from a source snapshot into a destination
/// snapshot, using only the columns the two schemas share. Tables are
/// processed one at a time in catalog-enumeration order; a failure in one
/// table never aborts the rest of the run.
#[derive(Debug, Clone)]
pub struct Migrator {
    excluded: BTreeSet<String>,
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Migrator {
    /// Create an engine with the default excluded-table set.
    pub fn new() -> Self {
        Self {
            excluded: DEFAULT_EXCLUDED_TABLES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Extend the excluded-table set.
    pub fn with_excluded<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(tables.into_iter().map(Into::into));
        self
    }

    /// Run the migration from `source` into `dest`.
    ///
    /// Opens both databases, drives the full table loop and returns the
    /// outcome. Both connections are released when this returns, on error
    /// paths included (drop semantics). Fatal errors - a database that
    /// cannot be opened, or a failing table enumeration - abort the run
    /// with no partial outcome; per-table failures land in the outcome's
    /// `errored` bucket instead.
    pub fn run(&self, source: &Path, dest: &Path) -> Result<MigrationOutcome> {
        let started_at = Utc::now();

        // Read-only source enforces the no-source-mutation guarantee at the
        // connection level; neither open may create a missing file.
        let src = open_database(source, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let mut dst = open_database(dest, OpenFlags::SQLITE_OPEN_READ_WRITE)?;

        let tables = catalog::discover_tables(&src)?;
        let dest_tables: BTreeSet<String> =
            catalog::discover_tables(&dst)?.into_iter().collect();

        info!(
            "Migrating {} tables from {} to {}",
            tables.len(),
            source.display(),
            dest.display()
        );

        let mut copied = Vec::new();
        let mut skipped = Vec::new();
        let mut errored = Vec::new();

        for table in &tables {
            if self.excluded.contains(table) {
                info!("{}: skipped (excluded internal table)", table);
                skipped.push(SkippedTable {
                    table: table.clone(),
                    reason: SkipReason::Excluded,
                });
                continue;
            }

            match self.migrate_table(&src, &mut dst, &dest_tables, table) {
                Ok(TableDisposition::Copied(rows)) => {
                    info!("{}: copied ({} rows)", table, rows);
                    copied.push(CopiedTable {
                        table: table.clone(),
                        rows,
                    });
                }
                Ok(TableDisposition::NoMatchingColumns) => {
                    warn!("{}: skipped (no matching columns)", table);
                    skipped.push(SkippedTable {
                        table: table.clone(),
                        reason: SkipReason::NoMatchingColumns,
                    });
                }
                Err(e) if e.is_per_table() => {
                    warn!("{}: failed - {}", table, e);
                    errored.push(ErroredTable {
                        table: table.clone(),
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let completed_at = Utc::now();
        let duration_seconds =
            (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let outcome = MigrationOutcome {
            started_at,
            completed_at,
            duration_seconds,
            tables_total: tables.len(),
            copied,
            skipped,
            errored,
        };

        info!(
            "Migration finished: {} copied, {} skipped, {} errored ({} rows in {:.2}s)",
            outcome.copied.len(),
            outcome.skipped.len(),
            outcome.errored.len(),
            outcome.rows_copied(),
            outcome.duration_seconds
        );

        Ok(outcome)
    }

    /// Per-table boundary: introspect both sides, reconcile, copy.
    ///
    /// Errors returned from here are per-table
    /// ([`MigrateError::Introspection`], [`MigrateError::Transfer`]) and are
    /// converted into outcome entries by the caller.
    fn migrate_table(
        &self,
        src: &Connection,
        dst: &mut Connection,
        dest_tables: &BTreeSet<String>,
        table: &str,
    ) -> Result<TableDisposition> {
        let src_columns = catalog::column_inventory(src, table)?;

        // An absent destination table is an empty inventory, which falls
        // out as an empty transfer schema below - a skip, not a crash.
        let dst_columns = if dest_tables.contains(table) {
            catalog::column_inventory(dst, table)?
        } else {
            Vec::new()
        };

        let columns = reconcile::transfer_schema(&src_columns, &dst_columns);
        if columns.is_empty() {
            return Ok(TableDisposition::NoMatchingColumns);
        }

        let rows = transfer::copy_table(src, dst, table, &columns)?;
        Ok(TableDisposition::Copied(rows))
    }
}

/// Migrate all compatible data from `source` into `dest`.
///
/// Convenience entry point using the default excluded-table set.
pub fn migrate(source: &Path, dest: &Path) -> Result<MigrationOutcome> {
    Migrator::new().run(source, dest)
}

fn open_database(path: &Path, flags: OpenFlags) -> Result<Connection> {
    Connection::open_with_flags(path, flags).map_err(|e| MigrateError::Open {
        path: path.to_path_buf(),
        source: e,
    })
}
