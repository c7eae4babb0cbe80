//! Mail index access
//!
//! The address book never indexes mail itself. It asks an existing mail
//! index for messages and reads their headers.

mod memory;
mod notmuch;

pub use memory::InMemoryMailIndex;
pub use notmuch::{IndexedMessage, NotmuchIndex};

use anyhow::Result;

/// Query selecting every message worth harvesting addresses from
pub const EXCLUDE_QUERY: &str = "NOT tag:junk AND NOT folder:drafts AND NOT tag:deleted";

/// Trait for mail index queries
pub trait MailIndex {
    /// Run a query and return the matching messages
    fn search(&self, query: &str) -> Result<Vec<IndexedMessage>>;
}
