//! Configuration loading for notmuch-based tools
//!
//! Locates and parses the notmuch INI configuration file, which is shared
//! between notmuch itself and the address book.
//!
//! The file is found in this order:
//! 1. An explicit path (usually from `--config`)
//! 2. The `NOTMUCH_CONFIG` environment variable
//! 3. `~/.notmuch-config`

use anyhow::{Context, Result};
use ini::{Ini, ParseOption};
use log::debug;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "NOTMUCH_CONFIG";

/// Config file used when neither a path nor the environment variable is set
pub const DEFAULT_CONFIG: &str = "~/.notmuch-config";

/// Expand a leading `~` to the user's home directory.
///
/// Paths without a leading tilde, and `~user` forms, are returned as-is.
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return PathBuf::from(path),
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest.trim_start_matches('/')),
        None => PathBuf::from(path),
    }
}

/// Resolve the config file path from the environment or the default location
pub fn default_config_path() -> PathBuf {
    let raw = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
    expand_tilde(&raw)
}

fn parse_options() -> ParseOption {
    // Backslashes in paths must survive untouched
    ParseOption {
        enabled_escape: false,
        ..ParseOption::default()
    }
}

/// A parsed notmuch configuration file
#[derive(Debug)]
pub struct Config {
    path: PathBuf,
    ini: Ini,
}

impl Config {
    /// Load the config file from `path`, or from the default location if `None`.
    ///
    /// A missing or unreadable file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => expand_tilde(&p.to_string_lossy()),
            None => default_config_path(),
        };
        debug!("Loading config from {}", path.display());

        let ini = Ini::load_from_file_opt(&path, parse_options())
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Ok(Self { path, ini })
    }

    /// Parse config content held in memory. `path` is only used for reporting.
    pub fn parse(content: &str, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let ini = Ini::load_from_str_opt(content, parse_options())
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(Self { path, ini })
    }

    /// Path of the file this config was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a raw value. Empty values are treated as unset.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.ini
            .get_from(Some(section), key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Get a value that must be present
    pub fn require(&self, section: &str, key: &str) -> Result<&str> {
        self.get(section, key).with_context(|| {
            format!(
                "Missing '{}.{}' in config file: {}",
                section,
                key,
                self.path.display()
            )
        })
    }

    /// Get a path value with `~` expanded
    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get(section, key).map(expand_tilde)
    }

    /// Get a path value that must be present, with `~` expanded
    pub fn require_path(&self, section: &str, key: &str) -> Result<PathBuf> {
        self.require(section, key).map(expand_tilde)
    }
}
