use crate::backup::TransferReport;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use std::path::Path;

/// Copies all month files into `<dir>/ledger`.
pub async fn backup(config: Config, dir: &Path) -> Result<Out<TransferReport>> {
    let report = config
        .backup()
        .backup_to(dir)
        .await
        .pub_result(ErrorType::Storage)?;
    let message = format!(
        "Backed up {} of {} month files to {} ({} skipped)",
        report.copied,
        report.total,
        dir.display(),
        report.skipped
    );
    Ok(Out::new(message, report))
}

/// Replaces the local month files with those found in `<dir>/ledger` or `<dir>`.
pub async fn restore(config: Config, dir: &Path) -> Result<Out<TransferReport>> {
    let report = config
        .backup()
        .restore_from(dir)
        .await
        .pub_result(ErrorType::Storage)?;
    let mut message = format!(
        "Restored {} of {} month files from {} ({} skipped)",
        report.copied,
        report.total,
        dir.display(),
        report.skipped
    );
    if let Some(snapshot) = &report.snapshot {
        message.push_str(&format!(
            ". The previous files were saved to {}",
            snapshot.display()
        ));
    }
    Ok(Out::new(message, report))
}
