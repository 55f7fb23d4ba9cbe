//! These structs provide the CLI interface for the pocket-ledger CLI.

use crate::model::{Amount, EntryKind, MemberGroup, MonthKey};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// pocket-ledger: A household ledger kept in plain markdown files.
///
/// Every month is stored as one human-readable file such as `2026-02.md`, grouped by day. The
/// files can be edited by hand. Entries can be shared with another ledger by pasting the text
/// printed by `share` into `import` on the other side.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the ledger home directory and its configuration file.
    ///
    /// By default the home directory is $HOME/pocket-ledger. Pass --ledger-home or set
    /// POCKET_LEDGER_HOME to keep it somewhere else.
    Init,
    /// Record a new entry.
    Add(AddArgs),
    /// Change a stored entry, found by its id. Only the given fields change.
    Edit(EditArgs),
    /// Delete a stored entry, found by its id.
    Delete(IdArgs),
    /// List entries, newest first.
    List(PeriodArgs),
    /// Show income, expense and balance totals.
    Summary(PeriodArgs),
    /// Print a readable summary of a few days followed by a sync block that another ledger can
    /// import.
    Share(ShareArgs),
    /// Import the entries of a sync block from a file or from stdin. Entries whose id is already
    /// stored are skipped.
    Import(ImportArgs),
    /// Copy all month files into <DIR>/ledger.
    Backup(DirArgs),
    /// Replace the local month files with those in <DIR>/ledger or <DIR>. The current files are
    /// kept in a snapshot under .backups first.
    Restore(DirArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger and its configuration are held. Defaults to
    /// ~/pocket-ledger
    #[arg(long, env = "POCKET_LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }
}

/// (Not shown): Args for the `pocket-ledger add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// expense or income
    #[arg(long, default_value_t = EntryKind::Expense)]
    kind: EntryKind,

    /// The amount, e.g. 12.5. Rounded to two decimal places.
    #[arg(long)]
    amount: Amount,

    #[arg(long)]
    category: String,

    #[arg(long, default_value = "")]
    note: String,

    /// One of xiaoxin, jieli, tongtong, elder, all. Defaults to the configured default member.
    #[arg(long)]
    member: Option<MemberGroup>,

    /// The local date and time, e.g. 2026-02-26T09:30. Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    at: Option<NaiveDateTime>,
}

impl AddArgs {
    pub fn new(kind: EntryKind, amount: Amount, category: impl Into<String>) -> Self {
        Self {
            kind,
            amount,
            category: category.into(),
            note: String::new(),
            member: None,
            at: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_member(mut self, member: MemberGroup) -> Self {
        self.member = Some(member);
        self
    }

    pub fn with_at(mut self, at: NaiveDateTime) -> Self {
        self.at = Some(at);
        self
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn member(&self) -> Option<MemberGroup> {
        self.member
    }

    pub fn at(&self) -> Option<NaiveDateTime> {
        self.at
    }
}

/// (Not shown): Args for the `pocket-ledger edit` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct EditArgs {
    /// The id of the entry, as shown by `list`.
    id: String,

    #[arg(long)]
    kind: Option<EntryKind>,

    #[arg(long)]
    amount: Option<Amount>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    note: Option<String>,

    #[arg(long)]
    member: Option<MemberGroup>,

    /// The new local date and time, e.g. 2026-02-26T09:30. May move the entry to another month.
    #[arg(long, value_parser = parse_timestamp)]
    at: Option<NaiveDateTime>,
}

impl EditArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_member(mut self, member: MemberGroup) -> Self {
        self.member = Some(member);
        self
    }

    pub fn with_at(mut self, at: NaiveDateTime) -> Self {
        self.at = Some(at);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> Option<EntryKind> {
        self.kind
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn member(&self) -> Option<MemberGroup> {
        self.member
    }

    pub fn at(&self) -> Option<NaiveDateTime> {
        self.at
    }
}

/// (Not shown): Args for commands that take an entry id.
#[derive(Debug, Parser, Clone)]
pub struct IdArgs {
    /// The id of the entry, as shown by `list`.
    id: String,
}

impl IdArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// (Not shown): Args for the `pocket-ledger list` and `pocket-ledger summary` commands.
#[derive(Debug, Default, Parser, Clone)]
pub struct PeriodArgs {
    /// Only this month, e.g. 2026-02. Defaults to the current month unless --year or --all is
    /// given.
    #[arg(long, conflicts_with_all = ["year", "all"])]
    month: Option<MonthKey>,

    /// Only this year, e.g. 2026.
    #[arg(long, conflicts_with = "all")]
    year: Option<i32>,

    /// Every month file.
    #[arg(long)]
    all: bool,

    /// Only entries of this member. `all` means no filtering.
    #[arg(long)]
    member: Option<MemberGroup>,
}

/// The months selected by `PeriodArgs`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Period {
    Month(MonthKey),
    Year(i32),
    All,
}

impl PeriodArgs {
    pub fn month(month: MonthKey) -> Self {
        Self {
            month: Some(month),
            ..Self::default()
        }
    }

    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn all() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    pub fn with_member(mut self, member: MemberGroup) -> Self {
        self.member = Some(member);
        self
    }

    /// The selected period, with `today` deciding the default month.
    pub fn period(&self, today: NaiveDate) -> Period {
        match (self.month, self.year, self.all) {
            (_, _, true) => Period::All,
            (Some(month), _, _) => Period::Month(month),
            (None, Some(year), _) => Period::Year(year),
            (None, None, false) => Period::Month(MonthKey::from_date(today)),
        }
    }

    pub fn member(&self) -> MemberGroup {
        self.member.unwrap_or_default()
    }
}

/// (Not shown): Args for the `pocket-ledger share` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ShareArgs {
    /// The first day to share, e.g. 2026-02-26. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// How many days to share, starting at --date. Defaults to the configured share_days.
    #[arg(long)]
    days: Option<u32>,

    /// Only entries of this member. `all` means no filtering.
    #[arg(long)]
    member: Option<MemberGroup>,
}

impl ShareArgs {
    pub fn new(date: NaiveDate, days: u32) -> Self {
        Self {
            date: Some(date),
            days: Some(days),
            member: None,
        }
    }

    pub fn with_member(mut self, member: MemberGroup) -> Self {
        self.member = Some(member);
        self
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn days(&self) -> Option<u32> {
        self.days
    }

    pub fn member(&self) -> MemberGroup {
        self.member.unwrap_or_default()
    }
}

/// (Not shown): Args for the `pocket-ledger import` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ImportArgs {
    /// A file holding the pasted text. Reads stdin when omitted.
    #[arg(long)]
    file: Option<PathBuf>,
}

impl ImportArgs {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self { file }
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

/// (Not shown): Args for the `pocket-ledger backup` and `pocket-ledger restore` commands.
#[derive(Debug, Parser, Clone)]
pub struct DirArgs {
    dir: PathBuf,
}

impl DirArgs {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Parses a local timestamp such as `2026-02-26T09:30`, `2026-02-26 09:30` or with seconds.
fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    [
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ]
    .iter()
    .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
    .ok_or_else(|| format!("expected a timestamp like 2026-02-26T09:30, got '{s}'"))
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("pocket-ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or POCKET_LEDGER_HOME instead of relying on the \
                default ledger home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("pocket-ledger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut full = vec!["pocket-ledger", "--ledger-home", "/tmp/ledger"];
        full.extend_from_slice(args);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_parse_add() {
        let args = parse(&[
            "add", "--amount", "12.5", "--category", "Food", "--member", "jieli", "--at",
            "2026-02-26T09:30",
        ]);
        let Command::Add(add) = args.command() else {
            panic!("expected add");
        };
        assert_eq!(add.kind(), EntryKind::Expense);
        assert_eq!(add.amount().to_string(), "12.50");
        assert_eq!(add.member(), Some(MemberGroup::Jieli));
        assert_eq!(
            add.at(),
            Some(NaiveDateTime::parse_from_str("2026-02-26 09:30", "%Y-%m-%d %H:%M").unwrap())
        );
        assert_eq!(args.common().ledger_home().path(), Path::new("/tmp/ledger"));
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        let base = ["pocket-ledger", "add", "--category", "Food", "--amount"];
        assert!(Args::try_parse_from(base.iter().chain(&["abc"])).is_err());
        assert!(Args::try_parse_from(
            base.iter().chain(&["1", "--kind", "refund"])
        )
        .is_err());
        assert!(Args::try_parse_from(
            base.iter().chain(&["1", "--member", "grandpa"])
        )
        .is_err());
    }

    #[test]
    fn test_period_defaults_to_current_month() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 26).unwrap();
        let Command::List(list) = parse(&["list"]).command().clone() else {
            panic!("expected list");
        };
        assert_eq!(
            list.period(today),
            Period::Month(MonthKey::new(2026, 2).unwrap())
        );
        let Command::Summary(summary) = parse(&["summary", "--year", "2025"]).command().clone()
        else {
            panic!("expected summary");
        };
        assert_eq!(summary.period(today), Period::Year(2025));
        assert_eq!(PeriodArgs::all().period(today), Period::All);
    }

    #[test]
    fn test_period_conflicts() {
        assert!(Args::try_parse_from(["pocket-ledger", "list", "--month", "2026-02", "--all"])
            .is_err());
        assert!(Args::try_parse_from(["pocket-ledger", "list", "--month", "2026-2"]).is_err());
    }

    #[test]
    fn test_parse_timestamp_forms() {
        assert!(parse_timestamp("2026-02-26T09:30").is_ok());
        assert!(parse_timestamp("2026-02-26 09:30:15").is_ok());
        assert!(parse_timestamp("26/02/2026").is_err());
    }
}
