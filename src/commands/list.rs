use crate::args::{Period, PeriodArgs};
use crate::commands::{describe, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Entry, EntryFilter, Summary};
use crate::store::LedgerStore;
use crate::{Config, Result};
use chrono::Local;

/// Lists the entries of the selected period, newest first.
pub async fn list(config: Config, args: PeriodArgs) -> Result<Out<Vec<Entry>>> {
    let store = config.store().pub_result(ErrorType::Storage)?;
    let (label, entries) = load(&store, &args)?;
    if entries.is_empty() {
        return Ok(Out::new(format!("No entries for {label}"), entries));
    }
    let mut lines = vec![format!("{} entries for {label}:", entries.len())];
    lines.extend(entries.iter().map(describe));
    let message = lines.join("\n");
    Ok(Out::new(message, entries))
}

/// Totals the entries of the selected period.
pub async fn summary(config: Config, args: PeriodArgs) -> Result<Out<Summary>> {
    let store = config.store().pub_result(ErrorType::Storage)?;
    let (label, entries) = load(&store, &args)?;
    let summary = store.summarize(&entries);
    let message = format!(
        "Summary for {label}:\nIncome: {}\nExpense: {}\nBalance: {}",
        summary.income_total, summary.expense_total, summary.balance
    );
    Ok(Out::new(message, summary))
}

fn load(store: &LedgerStore, args: &PeriodArgs) -> Result<(String, Vec<Entry>)> {
    let today = Local::now().date_naive();
    let (mut label, entries) = match args.period(today) {
        Period::Month(month) => (month.to_string(), store.load_month(month)),
        Period::Year(year) => (year.to_string(), store.load_year(year)),
        Period::All => ("all months".to_string(), store.load_all()),
    };
    let entries = entries.pub_result(ErrorType::Storage)?;
    let member = args.member();
    if !member.is_all() {
        label.push_str(&format!(" ({member})"));
    }
    Ok((label, EntryFilter::new().member(member).apply(entries)))
}
