//! In-memory mail index for testing

use anyhow::Result;

use super::{IndexedMessage, MailIndex};

/// Mail index holding a fixed list of messages
///
/// Every query returns all messages; filtering is the real index's job.
#[derive(Debug, Default)]
pub struct InMemoryMailIndex {
    messages: Vec<IndexedMessage>,
}

impl InMemoryMailIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message built from (header, value) pairs
    pub fn add(&mut self, id: &str, headers: &[(&str, &str)]) {
        self.messages.push(IndexedMessage::new(id, headers));
    }
}

impl MailIndex for InMemoryMailIndex {
    fn search(&self, _query: &str) -> Result<Vec<IndexedMessage>> {
        Ok(self.messages.clone())
    }
}
