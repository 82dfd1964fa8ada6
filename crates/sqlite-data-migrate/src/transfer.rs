//! Row transfer for a single reconciled table.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use crate::error::{MigrateError, Result};
use crate::identifier;

/// Copy every row of `table` from source to destination using only the
/// transfer schema's columns, in transfer-schema order.
///
/// The full result set is materialized before any insert runs; the target
/// data is single-user application data, so bounded memory use is an
/// accepted ceiling rather than a streaming pipeline.
///
/// Inserts run inside one per-table transaction on the destination,
/// committed after the last row. Row order follows the source query's
/// result order. The source database is never mutated.
///
/// # Errors
///
/// Any select, insert or commit failure maps to
/// [`MigrateError::Transfer`] carrying the table name, which the engine
/// catches at the per-table boundary.
pub fn copy_table(
    src: &Connection,
    dest: &mut Connection,
    table: &str,
    columns: &[String],
) -> Result<i64> {
    let quoted_table = identifier::quote(table)?;
    let quoted_cols = columns
        .iter()
        .map(|c| identifier::quote(c))
        .collect::<Result<Vec<_>>>()?;
    let col_list = quoted_cols.join(", ");

    let wrap = |e: rusqlite::Error| MigrateError::transfer(table, e.to_string());

    let select_sql = format!("SELECT {} FROM {}", col_list, quoted_table);
    let mut stmt = src.prepare(&select_sql).map_err(wrap)?;
    let rows = stmt
        .query_map([], |row| {
            (0..columns.len())
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<Value>>>()
        })
        .map_err(wrap)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(wrap)?;

    if rows.is_empty() {
        debug!("{}: no rows to copy", table);
        return Ok(0);
    }

    let placeholders = vec!["?"; columns.len()].join(", ");
    let insert_sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quoted_table, col_list, placeholders
    );

    let tx = dest.transaction().map_err(wrap)?;
    {
        let mut insert = tx.prepare(&insert_sql).map_err(wrap)?;
        for row in &rows {
            insert.execute(params_from_iter(row.iter())).map_err(wrap)?;
        }
    }
    tx.commit().map_err(wrap)?;

    Ok(rows.len() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn_with(sql: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        conn
    }

    #[test]
    fn test_copy_preserves_values_and_order() {
        let src = conn_with(
            "CREATE TABLE songs (id INTEGER, title TEXT);
             INSERT INTO songs VALUES (1, 'First'), (2, 'Second'), (3, NULL);",
        );
        let mut dest = conn_with("CREATE TABLE songs (id INTEGER, title TEXT);");

        let copied = copy_table(
            &src,
            &mut dest,
            "songs",
            &["id".to_string(), "title".to_string()],
        )
        .unwrap();
        assert_eq!(copied, 3);

        let rows: Vec<(i64, Option<String>)> = dest
            .prepare("SELECT id, title FROM songs ORDER BY rowid")
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(
            rows,
            vec![
                (1, Some("First".to_string())),
                (2, Some("Second".to_string())),
                (3, None),
            ]
        );
    }

    #[test]
    fn test_copy_empty_table_returns_zero() {
        let src = conn_with("CREATE TABLE songs (id INTEGER);");
        let mut dest = conn_with("CREATE TABLE songs (id INTEGER);");
        let copied = copy_table(&src, &mut dest, "songs", &["id".to_string()]).unwrap();
        assert_eq!(copied, 0);
    }

    #[test]
    fn test_copy_projects_subset_of_columns() {
        let src = conn_with(
            "CREATE TABLE songs (id INTEGER, title TEXT, artist TEXT);
             INSERT INTO songs VALUES (1, 'Song', 'Someone');",
        );
        let mut dest = conn_with("CREATE TABLE songs (id INTEGER, title TEXT);");

        let copied = copy_table(
            &src,
            &mut dest,
            "songs",
            &["id".to_string(), "title".to_string()],
        )
        .unwrap();
        assert_eq!(copied, 1);

        let title: String = dest
            .query_row("SELECT title FROM songs WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(title, "Song");
    }

    #[test]
    fn test_copy_reserved_keyword_names() {
        let src = conn_with(
            "CREATE TABLE \"order\" (id INTEGER, \"group\" TEXT);
             INSERT INTO \"order\" VALUES (1, 'a');",
        );
        let mut dest = conn_with("CREATE TABLE \"order\" (id INTEGER, \"group\" TEXT);");

        let copied = copy_table(
            &src,
            &mut dest,
            "order",
            &["id".to_string(), "group".to_string()],
        )
        .unwrap();
        assert_eq!(copied, 1);
    }

    #[test]
    fn test_constraint_violation_is_transfer_error() {
        let src = conn_with(
            "CREATE TABLE t (id INTEGER, v TEXT);
             INSERT INTO t VALUES (1, NULL);",
        );
        let mut dest = conn_with("CREATE TABLE t (id INTEGER, v TEXT NOT NULL);");

        let err = copy_table(&src, &mut dest, "t", &["id".to_string(), "v".to_string()])
            .unwrap_err();
        assert!(matches!(err, MigrateError::Transfer { ref table, .. } if table == "t"));

        // The failed per-table transaction must not leave partial rows.
        let count: i64 = dest
            .query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_source_is_never_mutated() {
        let src = conn_with(
            "CREATE TABLE t (id INTEGER);
             INSERT INTO t VALUES (1), (2);",
        );
        let mut dest = conn_with("CREATE TABLE t (id INTEGER);");

        copy_table(&src, &mut dest, "t", &["id".to_string()]).unwrap();

        let count: i64 = src
            .query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}
