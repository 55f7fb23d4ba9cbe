//! The plain-text month file format.
//!
//! - `line` formats and parses a single entry line.
//! - `document` edits the full text of one month file.
//! - `buffer` holds the lines of a file while it is being edited.

mod buffer;
mod document;
mod line;

pub use buffer::LineBuffer;
pub use document::{
    day_header, month_title, remove, upsert, MonthDocument, Scan, SkipReason, SkippedLine,
};
pub use line::{
    check_entry_line, format_entry_line, parse_entry_line, LineRejection, DELIMITER, ENTRY_MARKER,
};
