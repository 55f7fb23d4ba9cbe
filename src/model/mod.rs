//! Types that represent the core data model, such as `Entry` and `MonthKey`.
mod amount;
mod entry;
mod filter;
mod member;
mod month;

pub use amount::{Amount, AmountError};
pub use entry::{Entry, EntryKind, Summary};
pub use filter::EntryFilter;
pub use member::MemberGroup;
pub use month::{MonthKey, MONTH_FILE_EXTENSION};
