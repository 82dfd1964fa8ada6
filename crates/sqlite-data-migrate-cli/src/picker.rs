//! Interactive source-file selection.

use std::path::PathBuf;

use dialoguer::Input;
use sqlite_data_migrate::MigrateError;

/// Prompt for the source snapshot path.
///
/// An empty answer is a user-cancellation signal, reported as
/// [`MigrateError::Cancelled`] (controlled early exit, not a crash).
pub fn prompt_source() -> Result<PathBuf, MigrateError> {
    let answer: String = Input::new()
        .with_prompt("Source database or archive (.db/.zip, empty to cancel)")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| MigrateError::Io(std::io::Error::other(e.to_string())))?;

    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return Err(MigrateError::Cancelled);
    }
    Ok(PathBuf::from(trimmed))
}
