use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the ledger home directory, its `ledger` and `.backups` subdirectories and an initial
/// `config.json` with default settings.
///
/// # Errors
/// - Returns an error if the home is already initialized or if any file operations fail.
pub async fn init(ledger_home: &Path) -> Result<Out<()>> {
    let config = Config::create(ledger_home)
        .await
        .context("Unable to create the ledger home directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the ledger home at {}",
        config.root().display()
    )
    .into())
}
