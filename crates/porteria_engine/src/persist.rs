use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("invalid target path: {0}")]
    InvalidPath(String),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Writes `content` to `path` through a sibling temp file and a rename, so
/// readers see either the old file or the new one.
pub fn write_atomically(path: &Path, content: &[u8]) -> Result<(), PersistError> {
    if path.file_name().is_none() {
        return Err(PersistError::InvalidPath(path.display().to_string()));
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    } else if !dir.is_dir() {
        return Err(PersistError::InvalidPath(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}
