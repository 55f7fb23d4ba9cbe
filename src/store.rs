//! Reading and writing the directory of month files.
//!
//! Every mutation reads the whole month file, edits it in memory with `MonthDocument` and writes
//! the whole file back. Nothing is cached between calls. Callers that mutate the same month from
//! several threads must serialize those calls themselves.

use crate::markdown::{MonthDocument, Scan};
use crate::model::{Entry, MonthKey, Summary};
use crate::utils::generate_entry_id;
use crate::{fs, Result};
use anyhow::ensure;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The counts reported by `LedgerStore::import_entries`.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub imported: usize,
    pub skipped: usize,
}

/// A directory of month files such as `2026-02.md`.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    dir: PathBuf,
}

impl LedgerStore {
    /// Opens the store at `dir`, creating the directory if it does not exist.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The path of the file for `month`, whether or not it exists.
    pub fn month_path(&self, month: MonthKey) -> PathBuf {
        self.dir.join(month.file_name())
    }

    /// Saves `entry`, assigning a fresh id first if it has none. Returns the entry as saved.
    pub fn save(&self, entry: &Entry) -> Result<Entry> {
        let saved = if entry.has_id() {
            entry.clone()
        } else {
            entry.clone().with_id(generate_entry_id())
        };
        self.upsert(&saved)?;
        Ok(saved)
    }

    /// Makes sure `entry` has an id.
    ///
    /// An entry that already has an id is returned unchanged. Otherwise the first id-less line in
    /// the entry's month file with identical content is rewritten in place with a new id. If no
    /// such line exists the entry is returned with a new id and nothing is written.
    pub fn ensure_id(&self, entry: &Entry) -> Result<Entry> {
        if entry.has_id() {
            return Ok(entry.clone());
        }
        let id = generate_entry_id();
        let month = entry.month_key();
        let path = self.month_path(month);
        let Some(content) = fs::read_optional(&path)? else {
            return Ok(entry.clone().with_id(id));
        };

        let mut doc = MonthDocument::parse(&content);
        match doc.stamp_id(entry, &id) {
            Some(stamped) => {
                debug!("Assigned id {id} to an existing line in {}", path.display());
                fs::write_atomic(&path, doc.to_text())?;
                Ok(stamped)
            }
            None => Ok(entry.clone().with_id(id)),
        }
    }

    /// Replaces `original` with `updated`. The id of `original` is carried over to `updated`, which
    /// may land in a different month file. Returns the entry as saved.
    pub fn update(&self, original: &Entry, updated: &Entry) -> Result<Entry> {
        let original = self.ensure_id(original)?;
        let mut updated = updated.clone();
        updated.id = original.id.clone();
        ensure_storable(updated.month_key())?;

        if !self.remove(&original)? {
            warn!(
                "The entry being updated was not found in {}, saving the new version only",
                original.month_key().file_name()
            );
        }
        self.upsert(&updated)?;
        Ok(updated)
    }

    /// Deletes `entry` from its month file. Returns whether a line was removed.
    pub fn delete(&self, entry: &Entry) -> Result<bool> {
        let target = self.ensure_id(entry)?;
        self.remove(&target)
    }

    /// Loads one month, newest first.
    pub fn load_month(&self, month: MonthKey) -> Result<Vec<Entry>> {
        let mut entries = self.scan_month(month)?.entries;
        sort_newest_first(&mut entries);
        Ok(entries)
    }

    /// Loads one month in file order along with the lines that could not be read.
    pub fn load_month_report(&self, month: MonthKey) -> Result<Scan> {
        let path = self.month_path(month);
        Ok(match fs::read_optional(&path)? {
            Some(content) => MonthDocument::parse(&content).scan(),
            None => Scan::default(),
        })
    }

    /// Loads every month of `year`, newest first.
    pub fn load_year(&self, year: i32) -> Result<Vec<Entry>> {
        self.load_months(|month| month.year() == year)
    }

    /// Loads every month file, newest first.
    pub fn load_all(&self) -> Result<Vec<Entry>> {
        self.load_months(|_| true)
    }

    /// Lists the months that have a file, oldest first. Files that do not follow the `YYYY-MM.md`
    /// naming are ignored.
    pub fn months(&self) -> Result<Vec<MonthKey>> {
        let mut months: Vec<MonthKey> = fs::list_files(&self.dir)?
            .iter()
            .filter_map(|p| p.file_name())
            .filter_map(|name| MonthKey::from_file_name(&name.to_string_lossy()))
            .collect();
        months.sort();
        Ok(months)
    }

    /// Finds a stored entry by id.
    pub fn find_by_id(&self, id: &str) -> Result<Option<Entry>> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|entry| entry.id() == Some(id)))
    }

    /// Sums `entries` by kind.
    pub fn summarize(&self, entries: &[Entry]) -> Summary {
        Summary::of(entries)
    }

    /// Saves every candidate whose id is not already stored, oldest first.
    ///
    /// Candidates without an id get a fresh one and are always imported. Duplicates are detected by
    /// id alone, never by content.
    pub fn import_entries(&self, candidates: &[Entry]) -> Result<ImportOutcome> {
        let mut outcome = ImportOutcome::default();
        if candidates.is_empty() {
            return Ok(outcome);
        }

        let mut known: HashSet<String> = self
            .load_all()?
            .into_iter()
            .filter_map(|entry| entry.id().map(str::to_string))
            .collect();

        let mut ordered: Vec<&Entry> = candidates.iter().collect();
        ordered.sort_by_key(|entry| entry.timestamp());

        for candidate in ordered {
            let id = candidate
                .id()
                .map(str::to_string)
                .unwrap_or_else(generate_entry_id);
            if known.contains(&id) {
                debug!("Skipping import of entry {id}, it already exists");
                outcome.skipped += 1;
                continue;
            }
            self.save(&candidate.clone().with_id(id.clone()))?;
            known.insert(id);
            outcome.imported += 1;
        }
        Ok(outcome)
    }

    fn upsert(&self, entry: &Entry) -> Result<()> {
        let month = entry.month_key();
        ensure_storable(month)?;
        let path = self.month_path(month);
        let current = fs::read_optional(&path)?.unwrap_or_default();
        let mut doc = MonthDocument::parse(&current);
        doc.upsert(month, entry);
        debug!("Writing {}", path.display());
        fs::write_atomic(&path, doc.to_text())
    }

    fn remove(&self, entry: &Entry) -> Result<bool> {
        let path = self.month_path(entry.month_key());
        let Some(content) = fs::read_optional(&path)? else {
            return Ok(false);
        };
        let mut doc = MonthDocument::parse(&content);
        if !doc.remove(entry) {
            return Ok(false);
        }
        debug!("Writing {}", path.display());
        fs::write_atomic(&path, doc.to_text())?;
        Ok(true)
    }

    fn scan_month(&self, month: MonthKey) -> Result<Scan> {
        let scan = self.load_month_report(month)?;
        for skipped in &scan.skipped {
            warn!(
                "Skipping line {} of {}: {} ({})",
                skipped.line_number,
                month.file_name(),
                skipped.reason,
                skipped.text.trim()
            );
        }
        Ok(scan)
    }

    fn load_months(&self, include: impl Fn(MonthKey) -> bool) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for month in self.months()?.into_iter().filter(|m| include(*m)) {
            entries.extend(self.scan_month(month)?.entries);
        }
        sort_newest_first(&mut entries);
        Ok(entries)
    }
}

fn sort_newest_first(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
}

fn ensure_storable(month: MonthKey) -> Result<()> {
    ensure!(
        month.is_storable(),
        "Cannot store an entry dated in year {}",
        month.year()
    );
    Ok(())
}
