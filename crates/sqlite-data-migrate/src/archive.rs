//! Archive container handling for zip-wrapped database snapshots.
//!
//! Collaborator-side plumbing around the engine: extraction must fully
//! succeed before the engine runs, repackaging happens after it finishes.
//! Failures here are fatal to the overall flow but orthogonal to the
//! engine's own per-table error taxonomy.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{MigrateError, Result};

/// Unpack a zip container into a directory, preserving subdirectories.
///
/// Entry paths are resolved with `enclosed_name` so entries cannot escape
/// the extraction root (zip-slip).
pub fn extract(archive_path: &Path, destination_dir: &Path) -> Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(MigrateError::Io(io::Error::other(format!(
                "archive entry escapes extraction root: {}",
                entry.name()
            ))));
        };
        let out_path = destination_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
    }

    debug!(
        "Extracted {} into {}",
        archive_path.display(),
        destination_dir.display()
    );
    Ok(())
}

/// Recursively zip a directory tree back into a single container file.
///
/// Relative paths become the archive entry names, with forward slashes as
/// separators. Files are deflate-compressed.
pub fn repackage(source_dir: &Path, output_archive_path: &Path) -> Result<()> {
    let file = File::create(output_archive_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| io::Error::other(e.to_string()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }

        let name = relative.to_string_lossy().replace('\\', "/");
        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            let mut f = File::open(entry.path())?;
            io::copy(&mut f, &mut zip)?;
        }
    }

    zip.finish()?;
    debug!(
        "Repackaged {} into {}",
        source_dir.display(),
        output_archive_path.display()
    );
    Ok(())
}

/// Walk a directory tree and return the path of the database file inside.
///
/// First `.db` file in a sorted walk wins; if several candidates exist the
/// choice is first-match.
///
/// # Errors
///
/// Returns [`MigrateError::DatabaseNotFound`] when the tree holds no `.db`
/// file.
pub fn find_database_file(directory: &Path) -> Result<PathBuf> {
    for entry in WalkDir::new(directory).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "db")
        {
            return Ok(entry.path().to_path_buf());
        }
    }
    Err(MigrateError::DatabaseNotFound(directory.to_path_buf()))
}
