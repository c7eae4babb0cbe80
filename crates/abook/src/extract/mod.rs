//! Address extraction from mail headers
//!
//! Messages reach the extractor through the [`HeaderSource`] capability, so
//! raw messages read from stdin and messages returned by the mail index are
//! handled the same way.

mod extractor;
mod headers;

pub use extractor::{ADDRESS_HEADERS, AddressExtractor, ContactStream};
pub use headers::{HeaderSource, Mailbox};
