use crate::Result;
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs::ReadDir;
use uuid::Uuid;

/// Generates a new, globally unique entry id.
pub(crate) fn generate_entry_id() -> String {
    Uuid::new_v4().to_string()
}

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Read a file to a `String`.
pub async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Deserialize a JSON file into type `T`.
pub async fn deserialize<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let content = read(path).await?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON file at {}", path.display()))
}

/// Create a directory and any missing parents.
pub(crate) async fn make_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Unable to create directory {}", path.display()))
}

pub(crate) async fn canonicalize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("Unable to resolve path {}", path.display()))
}

pub(crate) async fn read_dir(path: impl AsRef<Path>) -> Result<ReadDir> {
    let path = path.as_ref();
    tokio::fs::read_dir(path)
        .await
        .with_context(|| format!("Unable to read directory {}", path.display()))
}

/// Copy a file, overwriting `to` if it exists.
pub(crate) async fn copy(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    let (from, to) = (from.as_ref(), to.as_ref());
    tokio::fs::copy(from, to).await.with_context(|| {
        format!(
            "Unable to copy file from '{}' to '{}'",
            from.display(),
            to.display()
        )
    })?;
    Ok(())
}

pub(crate) async fn remove(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::remove_file(path)
        .await
        .with_context(|| format!("Unable to remove file {}", path.display()))
}

pub(crate) async fn remove_dir_all(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::remove_dir_all(path)
        .await
        .with_context(|| format!("Unable to remove directory {}", path.display()))
}

/// Lists the file names of the regular files directly inside `dir`, sorted.
pub(crate) async fn file_names(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = read_dir(dir).await?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .context("Failed to read directory entry")?
    {
        let is_file = entry
            .file_type()
            .await
            .context("Failed to read file type")?
            .is_file();
        if is_file {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[test]
    fn test_generate_entry_id_is_unique() {
        let a = generate_entry_id();
        let b = generate_entry_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[tokio::test]
    async fn test_write_read_deserialize() {
        #[derive(Deserialize)]
        struct Thing {
            name: String,
        }
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("thing.json");
        write(&path, r#"{"name":"ledger"}"#).await.unwrap();
        let thing: Thing = deserialize(&path).await.unwrap();
        assert_eq!(thing.name, "ledger");
    }

    #[tokio::test]
    async fn test_file_names_skips_directories() {
        let dir = TempDir::new().unwrap();
        make_dir(dir.path().join("nested")).await.unwrap();
        write(dir.path().join("b.md"), "").await.unwrap();
        write(dir.path().join("a.md"), "").await.unwrap();
        let names = file_names(dir.path()).await.unwrap();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }

    #[tokio::test]
    async fn test_read_missing_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");
        let err = read(&path).await.unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }
}
