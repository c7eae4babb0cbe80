//! Address book settings
//!
//! Read from the `[database]` and `[addressbook]` sections of the notmuch
//! config file:
//!
//! ```ini
//! [database]
//! path=/home/me/mail
//!
//! [addressbook]
//! path=/home/me/.notmuch-abook.db
//! backend=sqlite3
//! ignorefile=/home/me/.notmuch-abook-ignore
//! ```

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::index::NotmuchIndex;
use crate::storage::{self, AddressStore, Backend};

/// Settings for one run of the address book
#[derive(Debug, Clone)]
pub struct AbookSettings {
    /// Config file the settings were read from
    pub config_path: PathBuf,
    /// Notmuch mail database, only needed to create the address book
    pub database_path: Option<PathBuf>,
    /// Address book store file
    pub store_path: PathBuf,
    /// Storage backend
    pub backend: Backend,
    /// Optional file of ignore rules
    pub ignore_file: Option<PathBuf>,
}

impl AbookSettings {
    /// Load settings from the config file at `path`, or the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = config::Config::load(path)?;
        Self::from_config(&config)
    }

    /// Extract settings from a parsed config.
    ///
    /// An unknown backend is rejected here, before any command runs.
    pub fn from_config(config: &config::Config) -> Result<Self> {
        let backend: Backend = config.require("addressbook", "backend")?.parse()?;

        Ok(Self {
            config_path: config.path().to_path_buf(),
            database_path: config.get_path("database", "path"),
            store_path: config.require_path("addressbook", "path")?,
            backend,
            ignore_file: config.get_path("addressbook", "ignorefile"),
        })
    }

    /// Open the configured address store
    pub fn store(&self) -> Box<dyn AddressStore> {
        storage::open(self.backend, &self.store_path)
    }

    /// The configured notmuch mail index
    pub fn mail_index(&self) -> Result<NotmuchIndex> {
        let Some(database_path) = &self.database_path else {
            anyhow::bail!(
                "Missing 'database.path' in config file: {}",
                self.config_path.display()
            );
        };
        Ok(NotmuchIndex::new(database_path).with_config(&self.config_path))
    }
}
