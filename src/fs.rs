//! Blocking file helpers used by the ledger store. Every error names the path involved.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub(crate) fn create_dir_all(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::create_dir_all(path)
        .with_context(|| format!("Unable to create directory {}", path.display()))
}

/// Reads a file to a `String`. A missing file reads as `None`.
pub(crate) fn read_optional(path: impl AsRef<Path>) -> Result<Option<String>> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Ok(None),
            _ => Err(e).context(format!("Unable to read file {}", path.display())),
        },
    }
}

/// Replaces the contents of `path` by writing a sibling temporary file and renaming it over the
/// original, so a failed write never leaves a half-written file behind.
pub(crate) fn write_atomic(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, contents)
        .with_context(|| format!("Unable to write data to {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| {
        format!(
            "Unable to move '{}' to '{}'",
            tmp.display(),
            path.display()
        )
    })
}

/// Lists the regular files directly inside `dir`. A missing directory lists as empty.
pub(crate) fn list_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let read_dir = match std::fs::read_dir(dir) {
        Ok(r) => r,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).context(format!("Unable to read directory {}", dir.display()));
        }
    };
    let mut files = Vec::new();
    for entry in read_dir {
        let entry =
            entry.with_context(|| format!("Unable to read an entry of {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
