use anyhow::{anyhow, Context};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The extension of every month file.
pub const MONTH_FILE_EXTENSION: &str = "md";

/// A calendar month. Identifies exactly one month file, e.g. `2026-02.md`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Returns `None` unless `month` is in `1..=12` and the year has four digits.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (0..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month containing `date`. Unlike `new` this does not check the year, so a key for a year
    /// past 9999 names a file that `from_file_name` will not accept. See `is_storable`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Whether the key has a four-digit year and so names a listable month file.
    pub fn is_storable(&self) -> bool {
        MonthKey::new(self.year, self.month).is_some()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The name of the file that stores this month, e.g. `2026-02.md`.
    pub fn file_name(&self) -> String {
        format!("{self}.{MONTH_FILE_EXTENSION}")
    }

    /// Parses a month file name such as `2026-02.md`. Any other name returns `None`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(&format!(".{MONTH_FILE_EXTENSION}"))?;
        let digits_ok = stem
            .char_indices()
            .all(|(i, c)| if i == 4 { c == '-' } else { c.is_ascii_digit() });
        if stem.len() != 7 || !digits_ok {
            return None;
        }
        MonthKey::from_str(stem).ok()
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .with_context(|| format!("Expected a month in the form YYYY-MM, got '{s}'"))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(anyhow!("Expected a month in the form YYYY-MM, got '{s}'"));
        }
        let year: i32 = year
            .parse()
            .with_context(|| format!("Invalid year in '{s}'"))?;
        let month: u32 = month
            .parse()
            .with_context(|| format!("Invalid month in '{s}'"))?;
        MonthKey::new(year, month).with_context(|| format!("Month out of range in '{s}'"))
    }
}

impl Serialize for MonthKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MonthKey::from_str(&s).map_err(serde::de::Error::custom)
    }
}
