use crate::model::{Amount, MemberGroup, MonthKey};
use crate::Result;
use anyhow::ensure;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Whether an entry takes money out or brings money in.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Expense,
    Income,
}

serde_plain::derive_display_from_serialize!(EntryKind);
serde_plain::derive_fromstr_from_deserialize!(EntryKind);

impl EntryKind {
    /// The lowercase keyword used in ledger lines and sync blocks.
    pub fn keyword(&self) -> &'static str {
        match self {
            EntryKind::Expense => "expense",
            EntryKind::Income => "income",
        }
    }

    /// Case-insensitive keyword lookup.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Some(EntryKind::Expense),
            "income" => Some(EntryKind::Income),
            _ => None,
        }
    }
}

/// One recorded financial transaction.
///
/// `id` is optional because lines written by older versions carry no id. Once an id has been
/// assigned it must never change for the lifetime of the entry.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub(crate) id: Option<String>,
    pub(crate) timestamp: NaiveDateTime,
    pub(crate) kind: EntryKind,
    pub(crate) amount: Amount,
    pub(crate) member: MemberGroup,
    pub(crate) category: String,
    pub(crate) note: String,
}

impl Entry {
    /// Creates an id-less entry attributed to `MemberGroup::All`. The timestamp is truncated to
    /// minute precision.
    pub fn new(
        timestamp: NaiveDateTime,
        kind: EntryKind,
        amount: Amount,
        category: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            timestamp: truncate_to_minute(timestamp),
            kind,
            amount,
            member: MemberGroup::All,
            category: category.into(),
            note: note.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_member(mut self, member: MemberGroup) -> Self {
        self.member = member;
        self
    }

    /// The id, if one is present and non-blank.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn has_id(&self) -> bool {
        self.id().is_some()
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn member(&self) -> MemberGroup {
        self.member
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    /// The month file this entry belongs to.
    pub fn month_key(&self) -> MonthKey {
        MonthKey::from_date(self.date())
    }

    /// Compares everything except the id. This is how an id-less line is matched to an entry.
    pub fn same_content(&self, other: &Entry) -> bool {
        self.timestamp == other.timestamp
            && self.kind == other.kind
            && self.amount == other.amount
            && self.member == other.member
            && self.category == other.category
            && self.note == other.note
    }

    /// Checks the constraints that user input must satisfy before it is saved.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.amount.is_positive(),
            "Amount must be greater than zero, got {}",
            self.amount
        );
        ensure!(
            !self.category.trim().is_empty(),
            "Category must not be blank"
        );
        ensure!(
            self.month_key().is_storable(),
            "Year must be between 0 and 9999, got {}",
            self.month_key().year()
        );
        Ok(())
    }
}

fn truncate_to_minute(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}

/// Income and expense totals for a set of entries.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub income_total: Amount,
    pub expense_total: Amount,
    pub balance: Amount,
}

impl Summary {
    /// Sums amounts by kind. The balance is income minus expense.
    pub fn of<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let (income_total, expense_total) = entries.into_iter().fold(
            (Amount::ZERO, Amount::ZERO),
            |(income, expense), entry| match entry.kind {
                EntryKind::Income => (income + entry.amount, expense),
                EntryKind::Expense => (income, expense + entry.amount),
            },
        );
        Self {
            income_total,
            expense_total,
            balance: income_total - expense_total,
        }
    }
}
