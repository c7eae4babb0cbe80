//! Storage trait definitions

use anyhow::Result;
use std::path::PathBuf;
use std::str::FromStr;

use crate::format::Sort;
use crate::ignore::IgnoreRules;
use crate::models::Contact;

/// Errors about the existence of the backing store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Can't create database at '{}'. File exists.", .0.display())]
    AlreadyExists(PathBuf),
    #[error("Database '{}' does not exist", .0.display())]
    Missing(PathBuf),
}

/// Error for a backend name no implementation exists for
#[derive(Debug, thiserror::Error)]
#[error("Database backend '{0}' is not implemented.")]
pub struct UnsupportedBackendError(pub String);

/// Available storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite3,
}

impl FromStr for Backend {
    type Err = UnsupportedBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sqlite3" => Ok(Self::Sqlite3),
            other => Err(UnsupportedBackendError(other.to_string())),
        }
    }
}

/// Trait for address book storage operations
///
/// Addresses are unique within a store. Callers normalize addresses before
/// handing them over; the store compares them exactly.
pub trait AddressStore {
    /// Create a new, empty store. Fails if one already exists.
    fn create(&self) -> Result<()>;

    /// Insert every contact from `contacts`, skipping duplicate addresses.
    /// Returns the number of contacts inserted.
    fn bulk_load(&self, contacts: &mut dyn Iterator<Item = Contact>) -> Result<usize>;

    /// Insert a contact, or with `replace` update the name of an existing one.
    ///
    /// Returns false if the address is ignored, or if it already exists and
    /// `replace` is not set.
    fn upsert(&self, contact: &Contact, ignore: &IgnoreRules, replace: bool) -> Result<bool>;

    /// Find contacts whose name or address has a word starting with `pattern`
    fn lookup(&self, pattern: &str) -> Result<Vec<Contact>>;

    /// List every contact, ordered by the chosen field
    fn fetch_all(&self, order: Sort) -> Result<Vec<Contact>>;

    /// Set the name for an address. Succeeds even if the address is unknown.
    fn change_name(&self, address: &str, name: &str) -> Result<bool>;

    /// Remove the backing store, if present
    fn delete_store(&self) -> Result<()>;
}
