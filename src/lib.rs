//! A household ledger stored as one markdown file per month, with a plain-text sync block for
//! moving entries between two ledgers.
//!
//! The core is synchronous: `LedgerStore` reads and rewrites whole month files through
//! `markdown::MonthDocument`, and `share` encodes and decodes sync blocks. `Config`, `Backup` and
//! the `commands` that drive the CLI are async.

mod backup;
mod config;
mod fs;
mod store;
mod utils;

pub mod args;
pub mod commands;
pub mod error;
pub mod markdown;
pub mod model;
pub mod share;


pub use backup::{Backup, TransferReport};
pub use config::Config;
pub use error::{Error, Result};
pub use store::{ImportOutcome, LedgerStore};
