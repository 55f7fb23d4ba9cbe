//! The sync block used to move entries between two ledgers as plain text, and the readable summary
//! that the block is appended to when sharing.
//!
//! A sync block can be embedded anywhere in a larger text, e.g. a chat message:
//!
//! ```text
//! ---POCKET_LEDGER_SYNC_START---
//! V|2
//! D|2026-02-26
//! E|6f1c...|2026-02-26T09:30:00|expense|jieli|25.50|Food|soy+milk
//! ---POCKET_LEDGER_SYNC_END---
//! ```
//!
//! Category and note are form-urlencoded so they can hold `|` and line breaks. Version `1` blocks
//! have no member field and decode with every member set to `all`.

use crate::model::{Amount, Entry, EntryFilter, EntryKind, MemberGroup, Summary};
use chrono::{Days, NaiveDate, NaiveDateTime};
use std::str::FromStr;
use url::form_urlencoded;

pub const SYNC_START: &str = "---POCKET_LEDGER_SYNC_START---";
pub const SYNC_END: &str = "---POCKET_LEDGER_SYNC_END---";

/// The version written by `build_sync_block`.
pub const CURRENT_VERSION: &str = "2";

/// The version without a member field. Still accepted when decoding.
pub const LEGACY_VERSION: &str = "1";

const TAG_VERSION: &str = "V";
const TAG_DATE: &str = "D";
const TAG_ENTRY: &str = "E";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Why a sync block that was found could not be read.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum SyncError {
    #[error("the sync block is incomplete, no end marker was found")]
    Incomplete,
    #[error("the sync version line is malformed")]
    BadVersionLine,
    #[error("sync version '{0}' is not supported")]
    UnsupportedVersion(String),
    #[error("the sync date '{0}' is malformed")]
    BadDate(String),
    #[error("a sync entry has too few fields: '{0}'")]
    BadEntry(String),
    #[error("a sync entry has a malformed timestamp '{0}'")]
    BadTimestamp(String),
    #[error("a sync entry has an unknown type '{0}'")]
    BadKind(String),
    #[error("a sync entry has a malformed amount '{0}'")]
    BadAmount(String),
}

/// The contents of a decoded sync block.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct SyncPayload {
    /// The reference date from the `D` line, if the block had one.
    pub date: Option<NaiveDate>,
    /// Entries in the order they appear in the block.
    pub entries: Vec<Entry>,
}

/// The outcome of looking for a sync block in a text.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SyncParse {
    /// The text contains no start marker.
    NotFound,
    /// A block was found but could not be read.
    Invalid(SyncError),
    Success(SyncPayload),
}

/// Encodes `entries` as a sync block, oldest entry first. The block does not end with a newline.
pub fn build_sync_block(date: NaiveDate, entries: &[Entry]) -> String {
    let mut ordered: Vec<&Entry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.timestamp());

    let mut lines = Vec::with_capacity(ordered.len() + 4);
    lines.push(SYNC_START.to_string());
    lines.push(format!("{TAG_VERSION}|{CURRENT_VERSION}"));
    lines.push(format!("{TAG_DATE}|{}", date.format(DATE_FORMAT)));
    for entry in ordered {
        lines.push(format!(
            "{TAG_ENTRY}|{}|{}|{}|{}|{}|{}|{}",
            entry.id().unwrap_or_default(),
            entry.timestamp().format(TIMESTAMP_FORMAT),
            entry.kind().keyword(),
            entry.member().code(),
            entry.amount(),
            encode(entry.category()),
            encode(entry.note()),
        ));
    }
    lines.push(SYNC_END.to_string());
    lines.join("\n")
}

/// Appends a sync block to `readable`, separated by one blank line.
pub fn append_sync_block(readable: &str, date: NaiveDate, entries: &[Entry]) -> String {
    let block = build_sync_block(date, entries);
    format!("{}\n\n{block}", readable.trim_end())
        .trim_end()
        .to_string()
}

/// Finds and decodes the first sync block in `text`.
pub fn parse_sync_block(text: &str) -> SyncParse {
    match decode(text) {
        Ok(Some(payload)) => SyncParse::Success(payload),
        Ok(None) => SyncParse::NotFound,
        Err(e) => SyncParse::Invalid(e),
    }
}

fn decode(text: &str) -> Result<Option<SyncPayload>, SyncError> {
    let normalized = text.replace("\r\n", "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();
    let Some(start) = lines.iter().position(|l| l.trim() == SYNC_START) else {
        return Ok(None);
    };
    let end = lines[start + 1..]
        .iter()
        .position(|l| l.trim() == SYNC_END)
        .map(|offset| start + 1 + offset)
        .ok_or(SyncError::Incomplete)?;

    let mut version = LEGACY_VERSION.to_string();
    let mut payload = SyncPayload::default();
    for line in &lines[start + 1..end] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split('|').collect();
        match parts[0] {
            TAG_VERSION => {
                let declared = parts.get(1).ok_or(SyncError::BadVersionLine)?;
                if *declared != LEGACY_VERSION && *declared != CURRENT_VERSION {
                    return Err(SyncError::UnsupportedVersion(declared.to_string()));
                }
                version = declared.to_string();
            }
            TAG_DATE => {
                let raw = parts.get(1).copied().unwrap_or_default();
                let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
                    .map_err(|_| SyncError::BadDate(raw.to_string()))?;
                payload.date = Some(date);
            }
            TAG_ENTRY => payload.entries.push(decode_entry(&parts, &version, line)?),
            _ => {}
        }
    }
    Ok(Some(payload))
}

fn decode_entry(parts: &[&str], version: &str, line: &str) -> Result<Entry, SyncError> {
    let has_member = version == CURRENT_VERSION;
    let min_fields = if has_member { 8 } else { 7 };
    if parts.len() < min_fields {
        return Err(SyncError::BadEntry(line.to_string()));
    }

    let timestamp =
        parse_timestamp(parts[2]).ok_or_else(|| SyncError::BadTimestamp(parts[2].to_string()))?;
    let kind =
        EntryKind::from_keyword(parts[3]).ok_or_else(|| SyncError::BadKind(parts[3].to_string()))?;
    let (member, rest) = if has_member {
        (MemberGroup::from_code(parts[4]), &parts[5..])
    } else {
        (MemberGroup::All, &parts[4..])
    };
    let amount =
        Amount::from_str(rest[0]).map_err(|_| SyncError::BadAmount(rest[0].to_string()))?;

    let mut entry = Entry::new(timestamp, kind, amount, decode_text(rest[1]), decode_text(rest[2]))
        .with_member(member);
    let id = parts[1].trim();
    if !id.is_empty() {
        entry = entry.with_id(id);
    }
    Ok(entry)
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .ok()
}

fn encode(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Form-urldecodes `s`. Malformed percent sequences are kept as they are.
fn decode_text(s: &str) -> String {
    let query = format!("v={}", s.replace('&', "%26"));
    form_urlencoded::parse(query.as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

/// What to include in a share text.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ShareRange {
    start: NaiveDate,
    days: u32,
    member: MemberGroup,
}

impl ShareRange {
    /// A range of `days` days beginning on `start`. A `days` of zero is treated as one.
    pub fn new(start: NaiveDate, days: u32) -> Self {
        Self {
            start,
            days: days.max(1),
            member: MemberGroup::All,
        }
    }

    pub fn with_member(mut self, member: MemberGroup) -> Self {
        self.member = member;
        self
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// The last day of the range, inclusive.
    pub fn end(&self) -> NaiveDate {
        self.day(self.days - 1)
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn filter(&self) -> EntryFilter {
        EntryFilter::new()
            .member(self.member)
            .between(self.start, self.end())
    }

    fn day(&self, offset: u32) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(u64::from(offset)))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// Renders a readable summary of the entries in `range` and appends their sync block.
///
/// `entries` may hold more than the range; anything outside it, or belonging to another member when
/// the range names one, is left out.
pub fn render_share_text(range: &ShareRange, entries: &[Entry]) -> String {
    let mut selected = range.filter().apply(entries.iter().cloned());
    selected.sort_by_key(|e| e.timestamp());
    let summary = Summary::of(&selected);

    let start = range.start().format(DATE_FORMAT);
    let mut lines = vec![if range.days() == 1 {
        format!("[{start} Ledger Summary]")
    } else {
        format!("[{start} to {} Ledger Summary]", range.end().format(DATE_FORMAT))
    }];
    lines.push(format!("Income: {}", summary.income_total));
    lines.push(format!("Expense: {}", summary.expense_total));
    lines.push(format!("Balance: {}", summary.balance));
    lines.push(String::new());
    lines.push("Daily details:".to_string());

    for offset in 0..range.days() {
        let day = range.day(offset);
        lines.push(format!("{}:", day.format(DATE_FORMAT)));
        let before = lines.len();
        lines.extend(
            selected
                .iter()
                .filter(|e| e.date() == day)
                .map(share_line),
        );
        if lines.len() == before {
            lines.push("No entries".to_string());
        }
    }
    let text = lines.join("\n");

    append_sync_block(&text, range.start(), &selected)
}

fn share_line(entry: &Entry) -> String {
    let mut line = format!(
        "{} {} {}",
        entry.timestamp().format("%H:%M"),
        entry.kind(),
        entry.category()
    );
    if !entry.member().is_all() {
        line.push_str(&format!(" ({})", entry.member().label()));
    }
    line.push_str(&format!(" {}", entry.amount()));
    if !entry.note().trim().is_empty() {
        line.push_str(&format!(" {}", entry.note()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn entry(when: &str, kind: EntryKind, amount: &str, category: &str, note: &str) -> Entry {
        Entry::new(at(when), kind, Amount::from_str(amount).unwrap(), category, note)
    }

    fn success(text: &str) -> SyncPayload {
        match parse_sync_block(text) {
            SyncParse::Success(payload) => payload,
            other => panic!("expected a payload, got {other:?}"),
        }
    }

    fn invalid(text: &str) -> SyncError {
        match parse_sync_block(text) {
            SyncParse::Invalid(e) => e,
            other => panic!("expected an invalid block, got {other:?}"),
        }
    }

    #[test]
    fn test_build_sync_block_layout() {
        let entries = vec![
            entry("2026-02-26 18:00", EntryKind::Income, "100", "Salary", "")
                .with_id("b")
                .with_member(MemberGroup::Jieli),
            entry("2026-02-26 08:05", EntryKind::Expense, "12.5", "Food", "soy milk & buns")
                .with_id("a"),
        ];
        let block = build_sync_block(date("2026-02-26"), &entries);
        assert_eq!(
            block,
            "---POCKET_LEDGER_SYNC_START---\n\
             V|2\n\
             D|2026-02-26\n\
             E|a|2026-02-26T08:05:00|expense|all|12.50|Food|soy+milk+%26+buns\n\
             E|b|2026-02-26T18:00:00|income|jieli|100.00|Salary|\n\
             ---POCKET_LEDGER_SYNC_END---"
        );
    }

    #[test]
    fn test_round_trip_keeps_order_and_fields() {
        let entries = vec![
            entry("2026-02-25 07:30", EntryKind::Expense, "3", "交通", "地铁|换乘")
                .with_member(MemberGroup::Tongtong),
            entry("2026-02-26 09:00", EntryKind::Income, "88.88", "奖金", "年终 奖")
                .with_id("id-2")
                .with_member(MemberGroup::Elder),
            entry("2026-02-26 21:15", EntryKind::Expense, "0.1", "a+b=c", "100%").with_id("id-3"),
        ];
        let text = append_sync_block("hello", date("2026-02-26"), &entries);
        let payload = success(&text);
        assert_eq!(payload.date, Some(date("2026-02-26")));
        assert_eq!(payload.entries, entries);
    }

    #[test]
    fn test_append_separates_with_blank_line() {
        let text = append_sync_block("summary\n\n\n", date("2026-02-26"), &[]);
        assert!(text.starts_with("summary\n\n---POCKET_LEDGER_SYNC_START---\n"));
        assert!(text.ends_with(SYNC_END));
    }

    #[test]
    fn test_not_found() {
        assert_eq!(parse_sync_block("just a chat message"), SyncParse::NotFound);
        assert_eq!(parse_sync_block(""), SyncParse::NotFound);
    }

    #[test]
    fn test_missing_end_is_invalid() {
        let text = format!("{SYNC_START}\nV|2\nD|2026-02-26\n");
        assert_eq!(invalid(&text), SyncError::Incomplete);
    }

    #[test]
    fn test_end_before_start_is_invalid() {
        let text = format!("{SYNC_END}\n{SYNC_START}\nV|2\n");
        assert_eq!(invalid(&text), SyncError::Incomplete);
    }

    #[test]
    fn test_unknown_version_is_invalid() {
        let text = format!("{SYNC_START}\nV|3\nE|x|2026-02-26T08:00:00|expense|all|1.00|a|b\n{SYNC_END}");
        assert_eq!(invalid(&text), SyncError::UnsupportedVersion("3".to_string()));
    }

    #[test]
    fn test_bare_version_tag_is_invalid() {
        let text = format!("{SYNC_START}\nV\n{SYNC_END}");
        assert_eq!(invalid(&text), SyncError::BadVersionLine);
    }

    #[test]
    fn test_legacy_version_defaults_member() {
        let text = format!(
            "chat text\r\n{SYNC_START}\r\nV|1\r\nD|2026-02-26\r\n\
             E||2026-02-26T08:00:00|expense|12.00|Food|\r\n\
             E|k|2026-02-26T09:00|INCOME|5|Gift|from+grandma\r\n{SYNC_END}\r\ntrailing"
        );
        let payload = success(&text);
        assert_eq!(payload.entries.len(), 2);
        assert!(payload.entries.iter().all(|e| e.member() == MemberGroup::All));
        assert_eq!(payload.entries[0].id(), None);
        assert_eq!(payload.entries[1].id(), Some("k"));
        assert_eq!(payload.entries[1].kind(), EntryKind::Income);
        assert_eq!(payload.entries[1].note(), "from grandma");
    }

    #[test]
    fn test_missing_version_line_means_legacy() {
        let text = format!("{SYNC_START}\nE|x|2026-02-26T08:00:00|expense|1.00|a|\n{SYNC_END}");
        let payload = success(&text);
        assert_eq!(payload.date, None);
        assert_eq!(payload.entries[0].category(), "a");
    }

    #[test]
    fn test_field_errors() {
        let bad = |line: &str| invalid(&format!("{SYNC_START}\nV|2\n{line}\n{SYNC_END}"));
        assert!(matches!(
            bad("E|x|2026-02-26T08:00:00|expense|all|1.00|a"),
            SyncError::BadEntry(_)
        ));
        assert!(matches!(
            bad("E|x|yesterday|expense|all|1.00|a|"),
            SyncError::BadTimestamp(_)
        ));
        assert!(matches!(
            bad("E|x|2026-02-26T08:00:00|refund|all|1.00|a|"),
            SyncError::BadKind(_)
        ));
        assert!(matches!(
            bad("E|x|2026-02-26T08:00:00|expense|all|lots|a|"),
            SyncError::BadAmount(_)
        ));
        assert!(matches!(bad("D|26/02/2026"), SyncError::BadDate(_)));
    }

    #[test]
    fn test_unknown_tags_and_member_codes_are_tolerated() {
        let text = format!(
            "{SYNC_START}\nV|2\nX|whatever\n\nE|x|2026-02-26T08:00:00.250|expense|grandpa|1.00|a||extra\n{SYNC_END}"
        );
        let payload = success(&text);
        let entry = &payload.entries[0];
        assert_eq!(entry.member(), MemberGroup::All);
        assert_eq!(entry.timestamp(), at("2026-02-26 08:00"));
    }

    #[test]
    fn test_decode_text_is_lenient() {
        assert_eq!(decode_text("50%+off"), "50% off");
        assert_eq!(decode_text("%E5%9C%B0%E9%93%81"), "地铁");
        assert_eq!(decode_text("a&b=c"), "a&b=c");
    }

    #[test]
    fn test_share_range_clamps_days() {
        let range = ShareRange::new(date("2026-02-28"), 0);
        assert_eq!(range.days(), 1);
        assert_eq!(range.end(), date("2026-02-28"));
        assert_eq!(ShareRange::new(date("2026-02-28"), 2).end(), date("2026-03-01"));
    }

    #[test]
    fn test_render_single_day() {
        let entries = vec![
            entry("2026-02-26 12:00", EntryKind::Expense, "30", "Food", "lunch")
                .with_id("b")
                .with_member(MemberGroup::Xiaoxin),
            entry("2026-02-26 08:00", EntryKind::Income, "100", "Salary", "").with_id("a"),
            entry("2026-02-27 08:00", EntryKind::Expense, "999", "Other", "").with_id("c"),
        ];
        let text = render_share_text(&ShareRange::new(date("2026-02-26"), 1), &entries);
        let (readable, block) = text.split_once(&format!("\n\n{SYNC_START}")).unwrap();
        assert_eq!(
            readable,
            "[2026-02-26 Ledger Summary]\n\
             Income: 100.00\n\
             Expense: 30.00\n\
             Balance: 70.00\n\
             \n\
             Daily details:\n\
             2026-02-26:\n\
             08:00 income Salary 100.00\n\
             12:00 expense Food (Xiaoxin) 30.00 lunch"
        );
        assert!(block.contains("E|a|"));
        assert!(block.contains("E|b|"));
        assert!(!block.contains("E|c|"));
        assert_eq!(success(&text).entries.len(), 2);
    }

    #[test]
    fn test_render_range_with_member_filter() {
        let entries = vec![
            entry("2026-02-26 12:00", EntryKind::Expense, "30", "Food", "")
                .with_member(MemberGroup::Jieli),
            entry("2026-02-27 12:00", EntryKind::Expense, "5", "Food", ""),
        ];
        let range = ShareRange::new(date("2026-02-26"), 2).with_member(MemberGroup::Jieli);
        let text = render_share_text(&range, &entries);
        assert!(text.starts_with("[2026-02-26 to 2026-02-27 Ledger Summary]\n"));
        assert!(text.contains("Expense: 30.00\n"));
        assert!(text.contains("2026-02-27:\nNo entries\n"));
        let payload = success(&text);
        assert_eq!(payload.date, Some(date("2026-02-26")));
        assert_eq!(payload.entries.len(), 1);
    }
}
