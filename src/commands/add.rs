use crate::args::AddArgs;
use crate::commands::{describe, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Entry;
use crate::{Config, Result};
use chrono::Local;
use tracing::debug;

/// Records a new entry. The member falls back to the configured default member and the timestamp
/// to the current local time.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<Entry>> {
    let at = args.at().unwrap_or_else(|| Local::now().naive_local());
    let member = args.member().unwrap_or(config.default_member());
    let entry = Entry::new(at, args.kind(), args.amount(), args.category().trim(), args.note())
        .with_member(member);
    entry.validate().pub_result(ErrorType::Input)?;

    let store = config.store().pub_result(ErrorType::Storage)?;
    let saved = store.save(&entry).pub_result(ErrorType::Storage)?;
    debug!("Saved entry {:?} to {}", saved.id(), saved.month_key().file_name());
    Ok(Out::new(format!("Saved {}", describe(&saved)), saved))
}
