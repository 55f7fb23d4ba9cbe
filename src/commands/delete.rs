use crate::args::IdArgs;
use crate::commands::{describe, Out};
use crate::error::{public_error, ErrorType, IntoResult};
use crate::model::Entry;
use crate::{Config, Result};

/// Deletes the stored entry with the given id.
pub async fn delete(config: Config, args: IdArgs) -> Result<Out<Entry>> {
    let store = config.store().pub_result(ErrorType::Storage)?;
    let Some(entry) = store.find_by_id(args.id()).pub_result(ErrorType::Storage)? else {
        return public_error(ErrorType::Input, format!("No entry has the id '{}'", args.id()));
    };
    if !store.delete(&entry).pub_result(ErrorType::Storage)? {
        return public_error(
            ErrorType::Storage,
            format!("The entry '{}' could not be removed", args.id()),
        );
    }
    Ok(Out::new(format!("Deleted {}", describe(&entry)), entry))
}
