//! Command handlers for the pocket-ledger CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod delete;
mod edit;
mod import;
mod init;
mod list;
mod share;
mod transfer;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use add::add;
pub use delete::delete;
pub use edit::edit;
pub use import::{import, import_text};
pub use init::init;
pub use list::{list, summary};
pub use share::share;
pub use transfer::{backup, restore};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        self.debug_structure();
    }

    /// Print the message to stdout, for output meant to be read or copied as-is, and the
    /// structured data (if it exists) as JSON to `debug!`.
    pub fn print_plain(&self) {
        println!("{}", self.message);
        self.debug_structure();
    }

    fn debug_structure(&self) {
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// One line describing `entry`, e.g. `2026-02-26 09:30 expense 12.50 Food soy milk [jieli] (id)`.
fn describe(entry: &crate::model::Entry) -> String {
    let mut line = format!(
        "{} {} {} {}",
        entry.timestamp().format("%Y-%m-%d %H:%M"),
        entry.kind(),
        entry.amount(),
        entry.category()
    );
    if !entry.note().is_empty() {
        line.push(' ');
        line.push_str(entry.note());
    }
    if !entry.member().is_all() {
        line.push_str(&format!(" [{}]", entry.member()));
    }
    if let Some(id) = entry.id() {
        line.push_str(&format!(" ({id})"));
    }
    line
}
