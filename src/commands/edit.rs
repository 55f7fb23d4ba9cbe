use crate::args::EditArgs;
use crate::commands::{describe, Out};
use crate::error::{public_error, ErrorType, IntoResult};
use crate::model::Entry;
use crate::{Config, Result};

/// Finds the stored entry with the given id and replaces the fields given in `args`. Changing the
/// timestamp to another month moves the entry to that month's file.
pub async fn edit(config: Config, args: EditArgs) -> Result<Out<Entry>> {
    let store = config.store().pub_result(ErrorType::Storage)?;
    let Some(original) = store.find_by_id(args.id()).pub_result(ErrorType::Storage)? else {
        return public_error(ErrorType::Input, format!("No entry has the id '{}'", args.id()));
    };

    let mut updated = Entry::new(
        args.at().unwrap_or(original.timestamp()),
        args.kind().unwrap_or(original.kind()),
        args.amount().unwrap_or(original.amount()),
        args.category().unwrap_or(original.category()).trim(),
        args.note().unwrap_or(original.note()),
    )
    .with_member(args.member().unwrap_or(original.member()));
    updated.validate().pub_result(ErrorType::Input)?;

    updated = store
        .update(&original, &updated)
        .pub_result(ErrorType::Storage)?;
    Ok(Out::new(format!("Updated {}", describe(&updated)), updated))
}
