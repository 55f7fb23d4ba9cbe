use serde::{Deserialize, Serialize};

/// The household member an entry is attributed to.
///
/// `All` means the entry is not attributed to anyone in particular. It is the default and it is
/// never written to a ledger line.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MemberGroup {
    Xiaoxin,
    Jieli,
    Tongtong,
    Elder,
    #[default]
    All,
}

serde_plain::derive_display_from_serialize!(MemberGroup);
serde_plain::derive_fromstr_from_deserialize!(MemberGroup);

impl MemberGroup {
    /// Every member group, in display order.
    pub const VALUES: [MemberGroup; 5] = [
        MemberGroup::Xiaoxin,
        MemberGroup::Jieli,
        MemberGroup::Tongtong,
        MemberGroup::Elder,
        MemberGroup::All,
    ];

    /// The code written into ledger lines and sync blocks.
    pub fn code(&self) -> &'static str {
        match self {
            MemberGroup::Xiaoxin => "xiaoxin",
            MemberGroup::Jieli => "jieli",
            MemberGroup::Tongtong => "tongtong",
            MemberGroup::Elder => "elder",
            MemberGroup::All => "all",
        }
    }

    /// Resolves a stored code. Unknown or blank codes fall back to `All` so that a line written by
    /// a newer version never becomes unreadable.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        Self::VALUES
            .into_iter()
            .find(|m| m.code().eq_ignore_ascii_case(code))
            .unwrap_or_default()
    }

    /// A human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            MemberGroup::Xiaoxin => "Xiaoxin",
            MemberGroup::Jieli => "Jieli",
            MemberGroup::Tongtong => "Tongtong",
            MemberGroup::Elder => "Elders",
            MemberGroup::All => "Everyone",
        }
    }

    pub fn is_all(&self) -> bool {
        *self == MemberGroup::All
    }
}
