//! Identifier validation and quoting for dynamically-built SQL.
//!
//! Table and column names cannot be passed as parameters in prepared
//! statements; only data values can. Every identifier interpolated into a
//! query therefore goes through this module: validate for suspicious
//! patterns (empty, null bytes, excessive length), then apply SQLite's
//! double-quote quoting with embedded quotes doubled.
//!
//! The names handled here come from the source database's own catalog, not
//! from attacker input, but defensive quoting also covers reserved-keyword
//! collisions (a user table named `order`, a column named `group`).

use crate::error::{MigrateError, Result};

/// Maximum identifier length accepted.
///
/// SQLite itself has no hard identifier limit; this is a sanity bound
/// against corrupt catalogs.
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes (injection vector)
/// - Identifiers exceeding maximum length
///
/// # Errors
///
/// Returns [`MigrateError::Identifier`] with a descriptive message.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MigrateError::Identifier(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(MigrateError::Identifier(format!(
            "Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(MigrateError::Identifier(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote a SQLite identifier.
///
/// Escapes double quotes by doubling them and wraps in double quotes.
/// Validates the identifier before quoting.
///
/// # Examples
///
/// ```
/// # use sqlite_data_migrate::identifier::quote;
/// assert_eq!(quote("songs").unwrap(), "\"songs\"");
/// assert_eq!(quote("table\"name").unwrap(), "\"table\"\"name\"");
/// ```
pub fn quote(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}
