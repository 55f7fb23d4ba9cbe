//! Editing the text of one month file.
//!
//! A month file is a title line followed by day sections:
//!
//! ```text
//! # 2026-02 Ledger
//!
//! ## 2026-02-26
//! - 08:00 | expense | 10.00 | Food | soy milk | @id=...
//!
//! ## 2026-02-25
//! - 18:00 | expense | 50.00 | Transit | metro
//! ```
//!
//! Sections stay in the order they appear in the file and new sections are appended at the end.
//! Lines that are not touched by an edit are preserved byte-for-byte.

use crate::markdown::buffer::LineBuffer;
use crate::markdown::line::{check_entry_line, format_entry_line, LineRejection, ENTRY_MARKER};
use crate::model::{Entry, MonthKey};
use chrono::NaiveDate;
use std::fmt::{Display, Formatter};

const TITLE_PREFIX: &str = "# ";
const DAY_PREFIX: &str = "## ";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// The first line of the month file for `month`, e.g. `# 2026-02 Ledger`.
pub fn month_title(month: MonthKey) -> String {
    format!("{TITLE_PREFIX}{month} Ledger")
}

/// The header line that opens the section for `date`, e.g. `## 2026-02-26`.
pub fn day_header(date: NaiveDate) -> String {
    format!("{DAY_PREFIX}{}", date.format(DATE_FORMAT))
}

/// Adds `entry` to the month file text `content` and returns the new text.
pub fn upsert(month: MonthKey, content: &str, entry: &Entry) -> String {
    let mut doc = MonthDocument::parse(content);
    doc.upsert(month, entry);
    doc.to_text()
}

/// Removes the first line matching `entry` from `content`. Returns `None` when nothing matched, in
/// which case the file should be left alone.
pub fn remove(content: &str, entry: &Entry) -> Option<String> {
    let mut doc = MonthDocument::parse(content);
    doc.remove(entry).then(|| doc.to_text())
}

/// A line that looked like an entry but could not be read.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SkippedLine {
    /// One-based line number within the file.
    pub line_number: usize,
    pub text: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SkipReason {
    Rejected(LineRejection),
    /// The line sits under a day header whose date could not be parsed, or under no header.
    NoValidDay,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Rejected(r) => Display::fmt(r, f),
            SkipReason::NoValidDay => f.write_str("not under a valid day header"),
        }
    }
}

/// The result of reading every entry line of a month file.
#[derive(Debug, Default, Clone)]
pub struct Scan {
    pub entries: Vec<Entry>,
    pub skipped: Vec<SkippedLine>,
}

/// The lines of one month file, held in memory for editing.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct MonthDocument {
    lines: LineBuffer,
}

/// One entry line located during a scan.
struct Located {
    index: usize,
    entry: Entry,
}

impl MonthDocument {
    pub fn parse(content: &str) -> Self {
        if content.trim().is_empty() {
            return Self::default();
        }
        Self {
            lines: LineBuffer::from_text(content),
        }
    }

    pub fn lines(&self) -> &LineBuffer {
        &self.lines
    }

    pub fn to_text(&self) -> String {
        self.lines.to_text()
    }

    /// Inserts the line for `entry`.
    ///
    /// If the entry's day section exists, the line goes immediately before the next day header,
    /// or at the end of the file when the section is the last one. Otherwise a new section is
    /// appended to the end of the file.
    pub fn upsert(&mut self, month: MonthKey, entry: &Entry) {
        self.ensure_title(month);

        let header = day_header(entry.date());
        let line = format_entry_line(entry);

        match self.lines.position(|l| l == header) {
            None => {
                self.lines.trim_trailing_blank();
                self.lines.push("");
                self.lines.push(header);
                self.lines.push(line);
            }
            Some(header_ix) => {
                let mut boundary = header_ix + 1;
                while self
                    .lines
                    .get(boundary)
                    .is_some_and(|l| !is_day_header(l.trim()))
                {
                    boundary += 1;
                }
                self.lines.insert(boundary, line);
            }
        }
    }

    /// Removes the first line that matches `target`: by id when `target` has one, otherwise by
    /// content. Returns whether a line was removed.
    pub fn remove(&mut self, target: &Entry) -> bool {
        let found = self.locate().find(|located| match target.id() {
            Some(id) => located.entry.id() == Some(id),
            None => located.entry.same_content(target),
        });
        match found {
            Some(located) => self.lines.remove(located.index).is_some(),
            None => false,
        }
    }

    /// Finds the first line without an id whose content equals `entry` and rewrites it in place
    /// with `id` appended. Returns the stamped entry, or `None` when no such line exists.
    pub fn stamp_id(&mut self, entry: &Entry, id: &str) -> Option<Entry> {
        let located = self
            .locate()
            .find(|located| !located.entry.has_id() && located.entry.same_content(entry))?;
        let stamped = located.entry.with_id(id);
        self.lines
            .replace(located.index, format_entry_line(&stamped));
        Some(stamped)
    }

    /// Reads every entry line in file order, collecting the ones that could not be read.
    pub fn scan(&self) -> Scan {
        let mut scan = Scan::default();
        self.walk(|item| match item {
            Ok(located) => scan.entries.push(located.entry),
            Err(skipped) => scan.skipped.push(skipped),
        });
        scan
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.scan().entries
    }

    fn locate(&self) -> impl Iterator<Item = Located> {
        let mut found = Vec::new();
        self.walk(|item| {
            if let Ok(located) = item {
                found.push(located)
            }
        });
        found.into_iter()
    }

    /// Visits every line that looks like an entry, tracking the active day from the headers above
    /// it. A header with an unparsable date clears the active day, so the lines below it are
    /// reported as skipped and cannot be matched until the next valid header.
    fn walk(&self, mut visit: impl FnMut(Result<Located, SkippedLine>)) {
        let mut day: Option<NaiveDate> = None;
        for (index, raw) in self.lines.iter().enumerate() {
            let line = raw.trim();
            if let Some(rest) = line.strip_prefix(DAY_PREFIX) {
                day = NaiveDate::parse_from_str(rest.trim(), DATE_FORMAT).ok();
                continue;
            }
            if !line.starts_with(ENTRY_MARKER) {
                continue;
            }
            let skipped = |reason| SkippedLine {
                line_number: index + 1,
                text: raw.to_string(),
                reason,
            };
            let item = match day {
                None => Err(skipped(SkipReason::NoValidDay)),
                Some(date) => match check_entry_line(date, line) {
                    Ok(entry) => Ok(Located { index, entry }),
                    Err(rejection) => Err(skipped(SkipReason::Rejected(rejection))),
                },
            };
            visit(item);
        }
    }

    fn ensure_title(&mut self, month: MonthKey) {
        let first = self.lines.iter().find(|l| !l.trim().is_empty());
        if !first.is_some_and(|l| l.trim().starts_with(TITLE_PREFIX)) {
            self.lines.insert(0, month_title(month));
        }
    }
}

fn is_day_header(trimmed: &str) -> bool {
    trimmed.starts_with(DAY_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, EntryKind, MemberGroup};
    use chrono::NaiveDateTime;
    use std::str::FromStr;

    fn feb() -> MonthKey {
        MonthKey::new(2026, 2).unwrap()
    }

    fn entry(at: &str, amount: &str, category: &str, note: &str) -> Entry {
        Entry::new(
            NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M").unwrap(),
            EntryKind::Expense,
            Amount::from_str(amount).unwrap(),
            category,
            note,
        )
    }

    const EXISTING: &str = "# 2026-02 Ledger

## 2026-02-26
- 08:00 | expense | 10.00 | 餐饮 | 豆浆

## 2026-02-25
- 18:00 | expense | 50.00 | 交通 | 地铁
";

    #[test]
    fn test_title_and_header() {
        assert_eq!(month_title(feb()), "# 2026-02 Ledger");
        let date = NaiveDate::from_ymd_opt(2026, 2, 6).unwrap();
        assert_eq!(day_header(date), "## 2026-02-06");
    }

    #[test]
    fn test_upsert_into_empty_content() {
        let e = entry("2026-02-26 09:30", "25.5", "餐饮", "早餐");
        let content = upsert(feb(), "", &e);
        assert_eq!(
            content,
            "# 2026-02 Ledger\n\n## 2026-02-26\n- 09:30 | expense | 25.50 | 餐饮 | 早餐\n"
        );
        assert_eq!(upsert(feb(), "  \n\n", &e), content);
    }

    #[test]
    fn test_upsert_into_existing_day_goes_before_next_header() {
        let e = entry("2026-02-26 09:30", "25.5", "餐饮", "早餐");
        let updated = upsert(feb(), EXISTING, &e);
        let expected = "# 2026-02 Ledger

## 2026-02-26
- 08:00 | expense | 10.00 | 餐饮 | 豆浆

- 09:30 | expense | 25.50 | 餐饮 | 早餐
## 2026-02-25
- 18:00 | expense | 50.00 | 交通 | 地铁
";
        assert_eq!(updated, expected);
    }

    #[test]
    fn test_upsert_line_sits_directly_above_next_header() {
        let e = entry("2026-02-26 09:00", "1", "Food", "new");
        let updated = upsert(feb(), EXISTING, &e);
        let lines: Vec<&str> = updated.lines().collect();
        let next = lines.iter().position(|l| *l == "## 2026-02-25").unwrap();
        assert_eq!(lines[next - 1], "- 09:00 | expense | 1.00 | Food | new");
        assert_eq!(lines[next - 2], "");
    }

    #[test]
    fn test_upsert_appends_to_last_day_at_eof() {
        let e = entry("2026-02-25 07:00", "3", "交通", "");
        let updated = upsert(feb(), EXISTING, &e);
        assert!(updated.ends_with(
            "- 18:00 | expense | 50.00 | 交通 | 地铁\n- 07:00 | expense | 3.00 | 交通 |\n"
        ));
    }

    #[test]
    fn test_upsert_appends_new_day_at_end() {
        let e = entry("2026-02-27 12:00", "8", "Food", "lunch");
        let updated = upsert(feb(), EXISTING, &e);
        assert!(updated.starts_with(EXISTING));
        assert!(updated.ends_with("\n\n## 2026-02-27\n- 12:00 | expense | 8.00 | Food | lunch\n"));
    }

    #[test]
    fn test_upsert_inserts_missing_title() {
        let content = "## 2026-02-26\n- 08:00 | expense | 10.00 | Food | x\n";
        let e = entry("2026-02-26 09:00", "1", "Food", "y");
        let updated = upsert(feb(), content, &e);
        assert!(updated.starts_with("# 2026-02 Ledger\n## 2026-02-26\n"));
    }

    #[test]
    fn test_upsert_normalizes_crlf() {
        let content = EXISTING.replace('\n', "\r\n");
        let e = entry("2026-02-27 12:00", "8", "Food", "lunch");
        let updated = upsert(feb(), &content, &e);
        assert!(!updated.contains('\r'));
    }

    #[test]
    fn test_remove_by_content() {
        let target = entry("2026-02-26 08:00", "10", "餐饮", "豆浆");
        let updated = remove(EXISTING, &target).unwrap();
        assert!(!updated.contains("豆浆"));
        assert!(updated.contains("## 2026-02-26\n"));
        assert!(updated.contains("- 18:00 | expense | 50.00 | 交通 | 地铁"));
    }

    #[test]
    fn test_remove_by_id() {
        let content = "# 2026-02 Ledger\n\n## 2026-02-26\n\
            - 08:00 | expense | 10.00 | Food | a | @id=one\n\
            - 08:00 | expense | 10.00 | Food | a | @id=two\n";
        let target = entry("2026-02-01 00:00", "99", "Other", "").with_id("two");
        let updated = remove(content, &target).unwrap();
        assert!(updated.contains("@id=one"));
        assert!(!updated.contains("@id=two"));
    }

    #[test]
    fn test_remove_only_first_match() {
        let content = "# 2026-02 Ledger\n\n## 2026-02-26\n\
            - 08:00 | expense | 10.00 | Food | a\n\
            - 08:00 | expense | 10.00 | Food | a\n";
        let target = entry("2026-02-26 08:00", "10", "Food", "a");
        let updated = remove(content, &target).unwrap();
        assert_eq!(updated.matches("| Food | a").count(), 1);
    }

    #[test]
    fn test_remove_no_match_is_none() {
        let target = entry("2026-02-26 08:00", "10", "餐饮", "other");
        assert_eq!(remove(EXISTING, &target), None);
        let with_member = entry("2026-02-26 08:00", "10", "餐饮", "豆浆")
            .with_member(MemberGroup::Elder);
        assert_eq!(remove(EXISTING, &with_member), None);
    }

    #[test]
    fn test_invalid_day_header_hides_entries() {
        let content = "# 2026-02 Ledger\n\n## someday\n- 08:00 | expense | 10.00 | Food | a\n\n\
            ## 2026-02-26\n- 09:00 | expense | 1.00 | Food | b\n";
        let doc = MonthDocument::parse(content);
        let scan = doc.scan();
        assert_eq!(scan.entries.len(), 1);
        assert_eq!(scan.entries[0].note(), "b");
        assert_eq!(scan.skipped.len(), 1);
        assert_eq!(scan.skipped[0].reason, SkipReason::NoValidDay);
        assert_eq!(scan.skipped[0].line_number, 4);

        let target = entry("2026-02-26 08:00", "10", "Food", "a");
        assert_eq!(remove(content, &target), None);
    }

    #[test]
    fn test_scan_reports_malformed_lines() {
        let content = "# 2026-02 Ledger\n\n## 2026-02-26\n\
            - 08:00 | expense | ten | Food | a\n\
            some free text\n\
            - 09:00 | income | 5 | Gift | b\n";
        let scan = MonthDocument::parse(content).scan();
        assert_eq!(scan.entries.len(), 1);
        assert_eq!(scan.skipped.len(), 1);
        assert_eq!(
            scan.skipped[0].reason,
            SkipReason::Rejected(LineRejection::BadAmount)
        );
    }

    #[test]
    fn test_stamp_id_rewrites_only_matching_line() {
        let mut doc = MonthDocument::parse(EXISTING);
        let target = entry("2026-02-25 18:00", "50", "交通", "地铁");
        let stamped = doc.stamp_id(&target, "new-id").unwrap();
        assert_eq!(stamped.id(), Some("new-id"));
        let text = doc.to_text();
        assert!(text.contains("- 18:00 | expense | 50.00 | 交通 | 地铁 | @id=new-id\n"));
        assert!(text.contains("- 08:00 | expense | 10.00 | 餐饮 | 豆浆\n"));

        // The line now has an id, so it is no longer eligible.
        assert!(doc.stamp_id(&target, "other").is_none());
    }

    #[test]
    fn test_untouched_sections_are_preserved() {
        let content = "# 2026-02 Ledger\n\n## 2026-02-25\n-   odd   spacing   \n\n\n## 2026-02-26\n";
        let e = entry("2026-02-26 09:00", "1", "Food", "b");
        let updated = upsert(feb(), content, &e);
        assert!(updated.starts_with("# 2026-02 Ledger\n\n## 2026-02-25\n-   odd   spacing   \n\n\n## 2026-02-26\n"));
    }
}
