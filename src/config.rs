//! Configuration file handling for the ledger home directory.
//!
//! The home directory holds `config.json`, the `ledger` directory of month files and a `.backups`
//! directory for the snapshots taken before a restore.

use crate::backup::Backup;
use crate::model::MemberGroup;
use crate::store::LedgerStore;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "pocket-ledger";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const SHARE_DAYS: u32 = 1;
const BACKUPS: &str = ".backups";
const LEDGER: &str = "ledger";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to the ledger home and from there it loads `config.json`. It provides paths to the
/// directories that are expected in a certain location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    ledger: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its subdirectories and an initial `config.json` with default
    /// settings.
    ///
    /// # Errors
    /// - Returns an error if `config.json` already exists or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the ledger home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "The ledger home is already initialized, found '{}'",
                config_path.display()
            )
        }

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;
        let ledger = root.join(LEDGER);
        utils::make_dir(&ledger).await?;

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            backups,
            ledger,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load the config file
    /// - validate that the ledger and backups directories exist
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The ledger home is missing, run 'pocket-ledger init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            root: root.clone(),
            backups: root.join(BACKUPS),
            ledger: root.join(LEDGER),
            config_path,
            config_file,
        };
        if !config.ledger.is_dir() {
            bail!(
                "The ledger directory is missing '{}'",
                config.ledger.display()
            )
        }
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The directory of month files.
    pub fn ledger(&self) -> &Path {
        &self.ledger
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// The member used for new entries when none is given.
    pub fn default_member(&self) -> MemberGroup {
        self.config_file.default_member
    }

    /// The number of days covered by `share` when none is given. Never less than one.
    pub fn share_days(&self) -> u32 {
        self.config_file.share_days.max(1)
    }

    /// Opens the ledger store in the home directory.
    pub fn store(&self) -> Result<LedgerStore> {
        LedgerStore::open(&self.ledger)
    }

    /// Creates a new `Backup` instance for copying month files in and out of the home directory.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "pocket-ledger",
///   "config_version": 1,
///   "backup_copies": 5,
///   "default_member": "all",
///   "share_days": 1
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "pocket-ledger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of pre-restore snapshots to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    /// Member applied to new entries when none is given
    #[serde(default)]
    default_member: MemberGroup,

    /// Number of days covered by `share` when none is given
    #[serde(default = "default_share_days")]
    share_days: u32,
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

fn default_share_days() -> u32 {
    SHARE_DAYS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
            default_member: MemberGroup::All,
            share_days: SHARE_DAYS,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "Config version {} is unsupported. Is a newer version of pocket-ledger available?",
            config.config_version
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
