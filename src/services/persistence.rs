use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use thiserror::Error;

/// Errors that can occur while writing files
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("No output file path given")]
    NoPath,

    #[error("{0} is not a regular file")]
    NotARegularFile(Utf8PathBuf),

    #[error("Failed to back up {path}: {source}")]
    Backup {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Backup location for a file: the same path with `.bak` appended
pub fn backup_path(path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{}.bak", path))
}

/// Copy an existing file to its backup location.
///
/// # Returns
/// The backup path, or `None` if there was nothing to back up
pub fn create_backup(path: &Utf8Path) -> Result<Option<Utf8PathBuf>, PersistenceError> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistenceError::Backup {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if !metadata.is_file() {
        return Err(PersistenceError::NotARegularFile(path.to_path_buf()));
    }

    let backup = backup_path(path);
    fs::copy(path, &backup).map_err(|source| PersistenceError::Backup {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Backed up {} to {}", path, backup);
    Ok(Some(backup))
}

/// Write `contents` to `path`, backing up any previous file first.
///
/// Nothing is written if the backup fails.
///
/// # Returns
/// The backup path, if a previous file existed
pub fn write_with_backup(
    path: &Utf8Path,
    contents: &str,
) -> Result<Option<Utf8PathBuf>, PersistenceError> {
    if path.as_str().is_empty() {
        return Err(PersistenceError::NoPath);
    }

    let backup = create_backup(path)?;

    fs::write(path, contents).map_err(|source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!("Saved {} bytes to {}", contents.len(), path);
    Ok(backup)
}
