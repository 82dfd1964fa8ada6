//! Catalog reader: table enumeration and column introspection.
//!
//! The source of truth is the database's own catalog (`sqlite_master` and
//! `PRAGMA table_info`), never a static schema file. This is what makes the
//! engine tolerant of schema drift between snapshots.

use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use crate::error::{MigrateError, Result};
use crate::identifier;

/// A table together with its ordered column names, as reported by the
/// database itself.
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<String>,
}

/// List the user tables defined in a database, in catalog order.
///
/// SQLite's own bookkeeping tables (`sqlite_sequence` and friends) are
/// filtered out by the catalog query itself; application-level exclusions
/// are the engine's concern, not this function's.
///
/// # Errors
///
/// Returns [`MigrateError::Catalog`] if the enumeration query fails. This is
/// fatal for the whole run.
pub fn discover_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'")?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!("Discovered {} tables", tables.len());
    Ok(tables)
}

/// Return the ordered column names of a table via `PRAGMA table_info`.
///
/// # Errors
///
/// Returns [`MigrateError::Introspection`] if the table does not exist at
/// call time (the pragma yields no rows). The engine treats this as fatal
/// for that table only, not for the whole run.
pub fn column_inventory(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let quoted = identifier::quote(table)?;
    let sql = format!("PRAGMA table_info({})", quoted);

    let wrap = |e: rusqlite::Error| MigrateError::introspection(table, e.to_string());

    let mut stmt = conn.prepare(&sql).map_err(wrap)?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(wrap)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(wrap)?;

    if columns.is_empty() {
        return Err(MigrateError::introspection(table, "no such table"));
    }

    Ok(columns)
}

/// Read the full catalog of a database file: every user table with its
/// column inventory.
///
/// Debugging surface for the CLI `inspect` command; the migration engine
/// itself introspects lazily, one table at a time.
pub fn inspect_database(path: &Path) -> Result<Vec<TableInfo>> {
    let conn = Connection::open(path).map_err(|e| MigrateError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut tables = Vec::new();
    for name in discover_tables(&conn)? {
        let columns = column_inventory(&conn, &name)?;
        tables.push(TableInfo { name, columns });
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE songs (id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT, artist TEXT);
             CREATE TABLE playlists (id INTEGER PRIMARY KEY, name TEXT);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_discover_tables_lists_user_tables() {
        let conn = test_db();
        let tables = discover_tables(&conn).unwrap();
        assert_eq!(tables, vec!["songs".to_string(), "playlists".to_string()]);
    }

    #[test]
    fn test_discover_tables_hides_sqlite_internals() {
        // The AUTOINCREMENT column creates sqlite_sequence.
        let conn = test_db();
        let tables = discover_tables(&conn).unwrap();
        assert!(!tables.iter().any(|t| t.starts_with("sqlite_")));
    }

    #[test]
    fn test_discover_tables_idempotent() {
        let conn = test_db();
        let first = discover_tables(&conn).unwrap();
        let second = discover_tables(&conn).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_column_inventory_preserves_order() {
        let conn = test_db();
        let columns = column_inventory(&conn, "songs").unwrap();
        assert_eq!(columns, vec!["id", "title", "artist"]);
    }

    #[test]
    fn test_column_inventory_missing_table() {
        let conn = test_db();
        let err = column_inventory(&conn, "nonexistent").unwrap_err();
        assert!(matches!(err, MigrateError::Introspection { ref table, .. } if table == "nonexistent"));
    }

    #[test]
    fn test_column_inventory_quoted_table_name() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE \"order\" (id INTEGER, \"group\" TEXT);")
            .unwrap();
        let columns = column_inventory(&conn, "order").unwrap();
        assert_eq!(columns, vec!["id", "group"]);
    }
}
