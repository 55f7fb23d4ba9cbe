use crate::args::ImportArgs;
use crate::commands::Out;
use crate::error::{public_error, ErrorType, IntoResult};
use crate::share::{parse_sync_block, SyncParse};
use crate::store::ImportOutcome;
use crate::{utils, Config, Result};
use anyhow::Context;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Reads pasted text from `--file` or stdin and imports the sync block it contains.
pub async fn import(config: Config, args: ImportArgs) -> Result<Out<ImportOutcome>> {
    let text = match args.file() {
        Some(path) => utils::read(path).await,
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Unable to read the pasted text from stdin")
                .map(|_| text)
        }
    }
    .pub_result(ErrorType::Input)?;
    import_text(config, &text).await
}

/// Imports the sync block found in `text`. Entries whose id is already stored are skipped.
pub async fn import_text(config: Config, text: &str) -> Result<Out<ImportOutcome>> {
    let payload = match parse_sync_block(text) {
        SyncParse::Success(payload) => payload,
        SyncParse::NotFound => {
            return public_error(ErrorType::Sync, "The text does not contain a sync block")
        }
        SyncParse::Invalid(e) => {
            return Err(e)
                .context("The sync block could not be read")
                .pub_result(ErrorType::Sync)
        }
    };
    debug!(
        "Found a sync block dated {:?} with {} entries",
        payload.date,
        payload.entries.len()
    );

    let store = config.store().pub_result(ErrorType::Storage)?;
    let outcome = store
        .import_entries(&payload.entries)
        .pub_result(ErrorType::Storage)?;
    Ok(Out::new(
        format!(
            "Imported {} entries, skipped {} already present",
            outcome.imported, outcome.skipped
        ),
        outcome,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PublicError;
    use crate::model::EntryKind;
    use crate::share::{build_sync_block, SYNC_START};
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    fn error_type(err: &anyhow::Error) -> ErrorType {
        err.downcast_ref::<PublicError>().unwrap().error_type()
    }

    #[tokio::test]
    async fn test_import_between_ledgers() {
        let sender = TestEnv::new().await;
        let shared = sender.save("2026-02-26 09:00", EntryKind::Expense, "4", "Food");
        let date = NaiveDate::from_ymd_opt(2026, 2, 26).unwrap();
        let text = format!("look:\n\n{}", build_sync_block(date, &[shared.clone()]));

        let receiver = TestEnv::new().await;
        let out = import_text(receiver.config(), &text).await.unwrap();
        assert_eq!(
            out.structure(),
            Some(&ImportOutcome {
                imported: 1,
                skipped: 0
            })
        );
        assert_eq!(receiver.store().load_all().unwrap(), vec![shared]);

        let again = import_text(receiver.config(), &text).await.unwrap();
        assert_eq!(again.message(), "Imported 0 entries, skipped 1 already present");
    }

    #[tokio::test]
    async fn test_import_from_file() {
        let env = TestEnv::new().await;
        let path = env.config().root().join("pasted.txt");
        let date = NaiveDate::from_ymd_opt(2026, 2, 26).unwrap();
        utils::write(&path, build_sync_block(date, &[])).await.unwrap();
        let out = import(env.config(), ImportArgs::new(Some(path))).await.unwrap();
        assert_eq!(out.structure().unwrap().imported, 0);
    }

    #[tokio::test]
    async fn test_import_not_found_and_invalid() {
        let env = TestEnv::new().await;
        let err = import_text(env.config(), "hello").await.unwrap_err();
        assert_eq!(error_type(&err), ErrorType::Sync);

        let err = import_text(env.config(), &format!("{SYNC_START}\nV|2\n"))
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), ErrorType::Sync);
        assert!(err.to_string().contains("no end marker"));
    }
}
