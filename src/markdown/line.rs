//! Formatting and parsing of a single entry line.
//!
//! An entry line looks like this:
//!
//! ```text
//! - 09:30 | expense | 25.50 | Food | breakfast | @member=jieli | @id=4f1c...
//! ```
//!
//! The first five fields are positional. Metadata tokens are optional and trail the note. The note
//! may itself contain `|`, which is why metadata is peeled off the end before the note is
//! reassembled from whatever positional text remains.

use crate::model::{Amount, Entry, EntryKind, MemberGroup};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Every entry line starts with this list-item marker.
pub const ENTRY_MARKER: &str = "- ";

/// Separates the fields of an entry line.
pub const DELIMITER: char = '|';

const ID_TAG: &str = "@id=";
const LEGACY_ID_TAG: &str = "id=";
const MEMBER_TAG: &str = "@member=";
const TIME_FORMAT: &str = "%H:%M";
const POSITIONAL_MIN: usize = 4;
const NOTE_INDEX: usize = 4;

/// Formats `entry` as one ledger line, without a trailing newline.
///
/// The member tag is only written when the member is not `MemberGroup::All`, and the id tag only
/// when the id is present and non-blank.
pub fn format_entry_line(entry: &Entry) -> String {
    let mut line = format!(
        "{ENTRY_MARKER}{} | {} | {} | {} | {}",
        entry.timestamp().format(TIME_FORMAT),
        entry.kind().keyword(),
        entry.amount(),
        entry.category(),
        entry.note()
    );
    if !entry.member().is_all() {
        line.push_str(&format!(" | {MEMBER_TAG}{}", entry.member().code()));
    }
    if let Some(id) = entry.id() {
        line.push_str(&format!(" | {ID_TAG}{id}"));
    }
    line
}

/// Parses a ledger line that sits under the day header for `date`. Returns `None` for anything
/// that is not a complete, well-formed entry line.
pub fn parse_entry_line(date: NaiveDate, line: &str) -> Option<Entry> {
    check_entry_line(date, line).ok()
}

/// Why a line was not accepted as an entry.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LineRejection {
    /// The line does not start with the list-item marker.
    NotAnEntry,
    /// Fewer than four positional fields remained after removing metadata.
    TooFewFields,
    BadTime,
    BadKind,
    BadAmount,
}

impl Display for LineRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LineRejection::NotAnEntry => "not an entry line",
            LineRejection::TooFewFields => "too few fields",
            LineRejection::BadTime => "invalid time",
            LineRejection::BadKind => "kind must be 'expense' or 'income'",
            LineRejection::BadAmount => "invalid amount",
        };
        f.write_str(s)
    }
}

/// Like `parse_entry_line` but reports the reason a line was rejected.
pub fn check_entry_line(date: NaiveDate, line: &str) -> Result<Entry, LineRejection> {
    let payload = line
        .strip_prefix(ENTRY_MARKER)
        .ok_or(LineRejection::NotAnEntry)?;
    let raw: Vec<&str> = payload.split(DELIMITER).collect();

    let trailing = TrailingMetadata::scan(&raw);
    let positional = &raw[..trailing.start];
    if positional.len() < POSITIONAL_MIN {
        return Err(LineRejection::TooFewFields);
    }

    let time = NaiveTime::parse_from_str(positional[0].trim(), TIME_FORMAT)
        .map_err(|_| LineRejection::BadTime)?;
    let kind = EntryKind::from_keyword(positional[1]).ok_or(LineRejection::BadKind)?;
    let amount = Amount::from_str(positional[2]).map_err(|_| LineRejection::BadAmount)?;
    let category = positional[3].trim();
    let note = if positional.len() > NOTE_INDEX {
        positional[NOTE_INDEX..].join(&DELIMITER.to_string())
    } else {
        String::new()
    };

    let mut entry = Entry::new(
        NaiveDateTime::new(date, time),
        kind,
        amount,
        category,
        note.trim(),
    )
    .with_member(trailing.member);
    if let Some(id) = trailing.id {
        entry = entry.with_id(id);
    }
    Ok(entry)
}

/// The metadata peeled off the end of a line.
#[derive(Debug, Default)]
struct TrailingMetadata {
    /// Index of the first metadata token. Everything before it is positional.
    start: usize,
    id: Option<String>,
    member: MemberGroup,
}

impl TrailingMetadata {
    /// Walks the tokens from the end, consuming them for as long as they are recognized metadata.
    fn scan(tokens: &[&str]) -> Self {
        let mut id = None;
        let mut legacy_id = None;
        let mut member = None;
        let mut start = tokens.len();
        let mut consuming = true;

        while consuming && start > 0 {
            let token = tokens[start - 1].trim();
            if let Some(value) = token.strip_prefix(ID_TAG) {
                id.get_or_insert_with(|| value.trim().to_string());
            } else if let Some(value) = token.strip_prefix(MEMBER_TAG) {
                member.get_or_insert_with(|| MemberGroup::from_code(value));
            } else if let Some(value) = token.strip_prefix(LEGACY_ID_TAG) {
                legacy_id.get_or_insert_with(|| value.trim().to_string());
            } else {
                consuming = false;
                continue;
            }
            start -= 1;
        }

        Self {
            start,
            id: id
                .or(legacy_id)
                .filter(|id: &String| !id.is_empty()),
            member: member.unwrap_or_default(),
        }
    }
}
