//! Storage traits and implementations
//!
//! This module defines the storage abstraction for the address book.
//! SQLite is the only backend; the trait leaves room for others.

mod sqlite;
mod traits;

pub use sqlite::SqliteAddressStore;
pub use traits::{AddressStore, Backend, StoreError, UnsupportedBackendError};

use std::path::Path;

/// Open the store for the configured backend
pub fn open(backend: Backend, path: &Path) -> Box<dyn AddressStore> {
    match backend {
        Backend::Sqlite3 => Box::new(SqliteAddressStore::new(path)),
    }
}
