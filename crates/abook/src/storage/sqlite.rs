//! SQLite-based address storage with full-text search
//!
//! Contacts live in an FTS4 virtual table. FTS tables cannot carry a UNIQUE
//! constraint, so inserts go through a view whose INSTEAD OF trigger aborts
//! when the address is already present.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use rusqlite_migration::{M, Migrations};

use super::traits::{AddressStore, StoreError};
use crate::format::Sort;
use crate::ignore::IgnoreRules;
use crate::models::Contact;

/// Schema for a new address book
///
/// Only applied by `create`. Address books created before the schema was
/// versioned have the same layout and open unchanged.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Full-text table with unique-address insert view
        M::up(
            r#"
            CREATE VIRTUAL TABLE AddressBook USING fts4(Name, Address);

            CREATE VIEW AddressBookView AS SELECT * FROM AddressBook;

            CREATE TRIGGER insert_into_ab
            INSTEAD OF INSERT ON AddressBookView
            BEGIN
                SELECT RAISE(ABORT, 'column name is not unique')
                  FROM AddressBook
                 WHERE Address = new.Address;
                INSERT INTO AddressBook VALUES(new.Name, new.Address);
            END;
            "#,
        ),
    ])
}

/// Whether an error is the duplicate-address abort raised by the insert trigger
fn is_duplicate(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

/// Build a full-text prefix query for `pattern`
///
/// Double quotes would end the phrase early, so they are dropped.
fn prefix_query(pattern: &str) -> Option<String> {
    let cleaned: String = pattern.chars().filter(|c| *c != '"').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(format!("\"{}*\"", cleaned))
    }
}

fn order_column(order: Sort) -> &'static str {
    match order {
        Sort::Name => "Name",
        Sort::Address => "Address",
    }
}

/// SQLite-based address storage
///
/// A connection is opened for each operation and closed before it returns.
pub struct SqliteAddressStore {
    path: PathBuf,
}

impl SqliteAddressStore {
    /// Create a store handle for the database file at `path`.
    ///
    /// Nothing is opened until an operation runs.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection to an existing database
    fn connect(&self) -> Result<Connection> {
        if !self.path.exists() {
            return Err(StoreError::Missing(self.path.clone()).into());
        }
        Connection::open(&self.path)
            .with_context(|| format!("Failed to open database at {:?}", self.path))
    }

    /// Insert through the unique-address view.
    ///
    /// Returns false when the address already exists.
    fn insert(conn: &Connection, contact: &Contact) -> Result<bool> {
        match conn.execute(
            "INSERT INTO AddressBookView VALUES (?, ?)",
            params![contact.name, contact.address],
        ) {
            Ok(_) => Ok(true),
            Err(e) if is_duplicate(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn query_contacts(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Contact>> {
        let mut stmt = conn.prepare(sql)?;
        let contacts = stmt
            .query_map(params, |row| {
                Ok(Contact {
                    name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    address: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(contacts)
    }
}

impl AddressStore for SqliteAddressStore {
    fn create(&self) -> Result<()> {
        if self.path.exists() {
            return Err(StoreError::AlreadyExists(self.path.clone()).into());
        }

        let mut conn = Connection::open(&self.path)
            .with_context(|| format!("Failed to create database at {:?}", self.path))?;
        migrations()
            .to_latest(&mut conn)
            .context("Failed to create address book schema")?;

        info!("Created address book at {}", self.path.display());
        Ok(())
    }

    fn bulk_load(&self, contacts: &mut dyn Iterator<Item = Contact>) -> Result<usize> {
        let mut conn = self.connect()?;

        // The store can be rebuilt from the mail index, so losing the last
        // transaction on a crash is acceptable
        conn.execute_batch("PRAGMA synchronous = OFF")?;

        let tx = conn.transaction()?;
        let mut added = 0;
        let mut skipped = 0;
        for contact in contacts {
            if Self::insert(&tx, &contact)? {
                added += 1;
            } else {
                skipped += 1;
            }
        }
        tx.commit()?;

        debug!("Bulk load added {} contacts, skipped {} duplicates", added, skipped);
        Ok(added)
    }

    fn upsert(&self, contact: &Contact, ignore: &IgnoreRules, replace: bool) -> Result<bool> {
        if ignore.matches(&contact.address) {
            debug!("Ignoring {}", contact.address);
            return Ok(false);
        }

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let changed = if replace {
            let present = tx
                .query_row(
                    "SELECT 1 FROM AddressBook WHERE Address = ?",
                    [&contact.address],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();

            if present {
                tx.execute(
                    "UPDATE AddressBook SET Name = ? WHERE Address = ?",
                    params![contact.name, contact.address],
                )?;
                true
            } else {
                Self::insert(&tx, contact)?
            }
        } else {
            Self::insert(&tx, contact)?
        };

        tx.commit()?;
        Ok(changed)
    }

    fn lookup(&self, pattern: &str) -> Result<Vec<Contact>> {
        let conn = self.connect()?;
        let Some(query) = prefix_query(pattern) else {
            return Ok(Vec::new());
        };

        Self::query_contacts(
            &conn,
            "SELECT Name, Address FROM AddressBook WHERE AddressBook MATCH ?",
            [query],
        )
    }

    fn fetch_all(&self, order: Sort) -> Result<Vec<Contact>> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT Name, Address FROM AddressBook ORDER BY {}",
            order_column(order)
        );
        Self::query_contacts(&conn, &sql, params![])
    }

    fn change_name(&self, address: &str, name: &str) -> Result<bool> {
        let conn = self.connect()?;
        let updated = conn.execute(
            "UPDATE AddressBook SET Name = ? WHERE Address = ?",
            params![name, address],
        )?;
        debug!("Renamed {} ({} rows)", address, updated);
        Ok(true)
    }

    fn delete_store(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to delete database at {:?}", self.path))?;
            info!("Deleted address book at {}", self.path.display());
        }
        Ok(())
    }
}
