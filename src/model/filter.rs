use crate::model::{Entry, MemberGroup};
use chrono::NaiveDate;

/// Selects entries by member group and by an inclusive date range. The default filter matches
/// everything.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct EntryFilter {
    member: MemberGroup,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl EntryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps entries tagged with `member`. `MemberGroup::All` means no member filtering.
    pub fn member(mut self, member: MemberGroup) -> Self {
        self.member = member;
        self
    }

    /// Keeps entries dated `from` through `to`, both inclusive.
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        let member_ok = self.member.is_all() || entry.member() == self.member;
        let date = entry.date();
        let from_ok = self.from.is_none_or(|from| date >= from);
        let to_ok = self.to.is_none_or(|to| date <= to);
        member_ok && from_ok && to_ok
    }

    pub fn apply(&self, entries: impl IntoIterator<Item = Entry>) -> Vec<Entry> {
        entries.into_iter().filter(|e| self.matches(e)).collect()
    }
}
