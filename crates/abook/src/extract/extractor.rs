//! Address extractor
//!
//! Pulls (name, address) pairs out of the address headers of a message,
//! normalizes them and drops addresses this extractor has already produced.

use std::collections::HashMap;

use super::HeaderSource;
use crate::models::Contact;

/// Headers that carry addresses, in the order they are read
pub const ADDRESS_HEADERS: [&str; 4] = ["to", "from", "cc", "bcc"];

/// Extracts unique contacts from messages
///
/// The dedup map lives as long as the extractor, so an address yielded
/// for one message is skipped for every later message too.
#[derive(Debug, Default)]
pub struct AddressExtractor {
    seen: HashMap<String, String>,
}

impl AddressExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract contacts from one message.
    ///
    /// Headers are parsed up front; dedup happens as the iterator is consumed.
    pub fn extract<'a>(
        &'a mut self,
        message: &dyn HeaderSource,
    ) -> impl Iterator<Item = Contact> + use<'a> {
        let candidates = parse_candidates(message);
        candidates.into_iter().filter(move |contact| {
            if !contact.has_address() || self.seen.contains_key(&contact.address) {
                return false;
            }
            self.seen
                .insert(contact.address.clone(), contact.name.clone());
            true
        })
    }

    /// Lazily extract contacts from a sequence of messages
    pub fn stream<I>(self, messages: I) -> ContactStream<I::IntoIter>
    where
        I: IntoIterator,
        I::Item: HeaderSource,
    {
        ContactStream {
            messages: messages.into_iter(),
            extractor: self,
            pending: Vec::new().into_iter(),
        }
    }
}

/// Iterator over the unique contacts of many messages
pub struct ContactStream<I> {
    messages: I,
    extractor: AddressExtractor,
    pending: std::vec::IntoIter<Contact>,
}

impl<I> Iterator for ContactStream<I>
where
    I: Iterator,
    I::Item: HeaderSource,
{
    type Item = Contact;

    fn next(&mut self) -> Option<Contact> {
        loop {
            if let Some(contact) = self.pending.next() {
                return Some(contact);
            }
            let message = self.messages.next()?;
            let found: Vec<Contact> = self.extractor.extract(&message).collect();
            self.pending = found.into_iter();
        }
    }
}

/// Parse all address headers of a message into normalized contacts
fn parse_candidates(message: &dyn HeaderSource) -> Vec<Contact> {
    ADDRESS_HEADERS
        .iter()
        .flat_map(|header| message.addresses(header))
        .map(|(name, address)| Contact::normalized(&name, &address))
        .collect()
}
