//! Address book crate - Business logic for the notmuch address book
//!
//! This crate provides:
//! - Domain model (Contact)
//! - Ignore rules for unwanted addresses
//! - Address extraction from mail headers
//! - Notmuch mail index adapter
//! - Full-text searchable address storage
//! - Text format codec (abook, csv, email)
//! - Action handlers for the command line verbs

pub mod actions;
pub mod config;
pub mod extract;
pub mod format;
pub mod ignore;
pub mod index;
pub mod models;
pub mod storage;

pub use actions::ActionHandler;
pub use config::AbookSettings;
pub use extract::{AddressExtractor, ContactStream, HeaderSource};
pub use format::{Format, InvalidOptionError, Sort, decode_line, format_contact, write_contacts};
pub use ignore::IgnoreRules;
pub use index::{EXCLUDE_QUERY, InMemoryMailIndex, IndexedMessage, MailIndex, NotmuchIndex};
pub use models::Contact;
pub use storage::{AddressStore, Backend, SqliteAddressStore, StoreError, UnsupportedBackendError};
