//! Copying month files to and from a plain directory, e.g. a synced folder or a USB stick.
//!
//! Only files named like `2026-02.md` take part. Before a restore replaces the local month files,
//! they are copied into a timestamped snapshot under `.backups`, and old snapshots are rotated.

use crate::model::MonthKey;
use crate::{utils, Config, Result};
use anyhow::bail;
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Prefix of the snapshot directories taken before a restore.
pub const SNAPSHOT_PREFIX: &str = "ledger_backup_";

/// The name of the directory that holds the month files inside a backup target.
pub const BACKUP_SUBDIR: &str = "ledger";

/// Counts reported by `Backup::backup_to` and `Backup::restore_from`.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct TransferReport {
    /// Month files found at the source.
    pub total: usize,
    /// Month files copied to the destination.
    pub copied: usize,
    /// Month files that could not be copied.
    pub skipped: usize,
    /// The snapshot of the local files taken before a restore.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
}

/// Manages backup and restore of the month files.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    ledger_dir: PathBuf,
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    /// Creates a new `Backup` instance from a `Config`.
    pub fn new(config: &Config) -> Self {
        Self {
            ledger_dir: config.ledger().to_path_buf(),
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
        }
    }

    /// Copies every local month file into `<target>/ledger/`, overwriting files of the same name.
    pub async fn backup_to(&self, target: &Path) -> Result<TransferReport> {
        let destination = target.join(BACKUP_SUBDIR);
        utils::make_dir(&destination).await?;
        let names = month_file_names(&self.ledger_dir).await?;
        let report = copy_files(&self.ledger_dir, &destination, &names).await;
        info!(
            "Backed up {} of {} month files to {}",
            report.copied,
            report.total,
            destination.display()
        );
        Ok(report)
    }

    /// Replaces the local month files with those found in `source`.
    ///
    /// The files are taken from `<source>/ledger/` if that directory exists, otherwise from
    /// `source` itself. It is an error if no month files are found there, in which case nothing
    /// local is touched.
    pub async fn restore_from(&self, source: &Path) -> Result<TransferReport> {
        let nested = source.join(BACKUP_SUBDIR);
        let source_dir = if nested.is_dir() {
            nested
        } else {
            source.to_path_buf()
        };
        let names = month_file_names(&source_dir).await?;
        if names.is_empty() {
            bail!(
                "No month files (YYYY-MM.md) were found in '{}'",
                source_dir.display()
            )
        }

        let snapshot = self.snapshot().await?;
        self.rotate().await?;

        for name in month_file_names(&self.ledger_dir).await? {
            utils::remove(self.ledger_dir.join(&name)).await?;
        }

        let mut report = copy_files(&source_dir, &self.ledger_dir, &names).await;
        report.snapshot = Some(snapshot);
        info!(
            "Restored {} of {} month files from {}",
            report.copied,
            report.total,
            source_dir.display()
        );
        Ok(report)
    }

    /// Copies the local month files into a new snapshot directory and returns its path.
    async fn snapshot(&self) -> Result<PathBuf> {
        let base = format!("{SNAPSHOT_PREFIX}{}", now());
        let mut dir = self.backups_dir.join(&base);
        let mut seq = 1;
        while dir.exists() {
            seq += 1;
            dir = self.backups_dir.join(format!("{base}_{seq}"));
        }
        utils::make_dir(&dir).await?;

        for name in month_file_names(&self.ledger_dir).await? {
            utils::copy(self.ledger_dir.join(&name), dir.join(&name)).await?;
        }
        debug!("Saved a snapshot of the local month files to {}", dir.display());
        Ok(dir)
    }

    /// Deletes the oldest snapshots, keeping only `backup_copies` of them.
    async fn rotate(&self) -> Result<()> {
        let mut snapshots: Vec<String> = Vec::new();
        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(SNAPSHOT_PREFIX) && entry.path().is_dir() {
                snapshots.push(name);
            }
        }

        // The timestamp format sorts by name.
        snapshots.sort();

        let to_delete = snapshots.len().saturating_sub(self.backup_copies as usize);
        for name in snapshots.into_iter().take(to_delete) {
            debug!("Removing old snapshot {name}");
            utils::remove_dir_all(self.backups_dir.join(name)).await?;
        }
        Ok(())
    }
}

/// The names of the month files directly inside `dir`, sorted.
pub(crate) async fn month_file_names(dir: &Path) -> Result<Vec<String>> {
    Ok(utils::file_names(dir)
        .await?
        .into_iter()
        .filter(|name| MonthKey::from_file_name(name).is_some())
        .collect())
}

async fn copy_files(from: &Path, to: &Path, names: &[String]) -> TransferReport {
    let mut report = TransferReport {
        total: names.len(),
        ..TransferReport::default()
    };
    for name in names {
        match utils::copy(from.join(name), to.join(name)).await {
            Ok(()) => report.copied += 1,
            Err(e) => {
                warn!("Skipping {name}: {e:#}");
                report.skipped += 1;
            }
        }
    }
    report
}

/// The local time formatted for snapshot names, e.g. `20260226_093000`.
fn now() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use tempfile::TempDir;

    async fn write(dir: &Path, name: &str, contents: &str) {
        utils::make_dir(dir).await.unwrap();
        utils::write(dir.join(name), contents).await.unwrap();
    }

    #[tokio::test]
    async fn test_month_file_names_filters() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "2026-02.md", "").await;
        write(dir.path(), "2026-2.md", "").await;
        write(dir.path(), "notes.md", "").await;
        write(dir.path(), "2026-01.md.tmp", "").await;
        let names = month_file_names(dir.path()).await.unwrap();
        assert_eq!(names, vec!["2026-02.md"]);
    }

    #[tokio::test]
    async fn test_backup_to_copies_month_files() {
        let env = TestEnv::new().await;
        let config = env.config();
        write(config.ledger(), "2026-01.md", "# 2026-01 Ledger\n").await;
        write(config.ledger(), "2026-02.md", "# 2026-02 Ledger\n").await;
        write(config.ledger(), "scratch.txt", "x").await;

        let target = TempDir::new().unwrap();
        write(&target.path().join(BACKUP_SUBDIR), "2026-02.md", "stale").await;
        let report = config.backup().backup_to(target.path()).await.unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.copied, 2);
        assert_eq!(report.skipped, 0);
        let copied = utils::read(&target.path().join("ledger").join("2026-02.md"))
            .await
            .unwrap();
        assert_eq!(copied, "# 2026-02 Ledger\n");
        assert!(!target.path().join("ledger").join("scratch.txt").exists());
    }

    #[tokio::test]
    async fn test_restore_from_nested_dir() {
        let env = TestEnv::new().await;
        let config = env.config();
        write(config.ledger(), "2025-12.md", "old local").await;

        let source = TempDir::new().unwrap();
        let nested = source.path().join(BACKUP_SUBDIR);
        write(&nested, "2026-01.md", "restored").await;
        write(&nested, "readme.txt", "ignored").await;

        let report = config.backup().restore_from(source.path()).await.unwrap();
        assert_eq!(report.total, 1);
        assert_eq!(report.copied, 1);

        let local = month_file_names(config.ledger()).await.unwrap();
        assert_eq!(local, vec!["2026-01.md"]);

        let snapshot = report.snapshot.unwrap();
        assert!(snapshot.starts_with(config.backups()));
        let saved = utils::read(&snapshot.join("2025-12.md")).await.unwrap();
        assert_eq!(saved, "old local");
    }

    #[tokio::test]
    async fn test_restore_from_flat_dir() {
        let env = TestEnv::new().await;
        let config = env.config();
        let source = TempDir::new().unwrap();
        write(source.path(), "2026-03.md", "flat").await;
        let report = config.backup().restore_from(source.path()).await.unwrap();
        assert_eq!(report.copied, 1);
        assert!(config.ledger().join("2026-03.md").is_file());
    }

    #[tokio::test]
    async fn test_restore_without_month_files_changes_nothing() {
        let env = TestEnv::new().await;
        let config = env.config();
        write(config.ledger(), "2026-01.md", "keep").await;
        let source = TempDir::new().unwrap();
        write(source.path(), "notes.txt", "").await;

        assert!(config.backup().restore_from(source.path()).await.is_err());
        assert!(config.ledger().join("2026-01.md").is_file());
        assert_eq!(std::fs::read_dir(config.backups()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_snapshots_are_rotated() {
        let env = TestEnv::new().await;
        let config = env.config();
        let backup = Backup {
            backup_copies: 2,
            ..config.backup()
        };
        for name in ["ledger_backup_20200101_000000", "ledger_backup_20200102_000000"] {
            utils::make_dir(config.backups().join(name)).await.unwrap();
        }
        let source = TempDir::new().unwrap();
        write(source.path(), "2026-03.md", "x").await;

        let report = backup.restore_from(source.path()).await.unwrap();

        let mut remaining = Vec::new();
        let mut dir = utils::read_dir(config.backups()).await.unwrap();
        while let Some(entry) = dir.next_entry().await.unwrap() {
            remaining.push(entry.path());
        }
        remaining.sort();
        assert_eq!(remaining.len(), 2);
        assert!(remaining[0].ends_with("ledger_backup_20200102_000000"));
        assert_eq!(Some(&remaining[1]), report.snapshot.as_ref());
    }
}
