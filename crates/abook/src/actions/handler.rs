//! Action handler for the address book commands
//!
//! Each command is a single pass over the store, the ignore rules and the
//! input or output stream it is given.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::io::{BufRead, BufReader, Read, Write};

use crate::extract::AddressExtractor;
use crate::format::{Format, Sort, decode_line, write_contacts};
use crate::ignore::IgnoreRules;
use crate::index::{EXCLUDE_QUERY, MailIndex};
use crate::models::Contact;
use crate::storage::AddressStore;

/// Hint shown when input is not valid UTF-8
const ENCODING_HINT: &str = "input is not valid UTF-8; convert it (e.g. with iconv) and import again";

/// Handler for address book commands
pub struct ActionHandler {
    store: Box<dyn AddressStore>,
    ignore: IgnoreRules,
}

impl ActionHandler {
    /// Create a new action handler
    pub fn new(store: Box<dyn AddressStore>, ignore: IgnoreRules) -> Self {
        Self { store, ignore }
    }

    pub fn store(&self) -> &dyn AddressStore {
        self.store.as_ref()
    }

    /// Create the store and fill it from every message in the mail index.
    ///
    /// Returns the number of addresses added.
    pub fn create(&self, index: &dyn MailIndex) -> Result<usize> {
        self.store.create()?;

        let messages = index.search(EXCLUDE_QUERY)?;
        info!("Harvesting addresses from {} messages", messages.len());

        let mut contacts = AddressExtractor::new()
            .stream(messages)
            .filter(|contact| !self.ignore.matches(&contact.address));
        self.store.bulk_load(&mut contacts)
    }

    /// Add the addresses of one raw message, keeping existing names.
    ///
    /// Returns the number of addresses added.
    pub fn update(&self, raw_message: &[u8]) -> Result<usize> {
        let mail = mailparse::parse_mail(raw_message).context("Failed to parse mail message")?;

        let mut added = 0;
        for contact in AddressExtractor::new().extract(&mail) {
            if self.store.upsert(&contact, &self.ignore, false)? {
                added += 1;
            }
        }
        debug!("Update added {} addresses", added);
        Ok(added)
    }

    /// Write contacts matching `pattern` to `out`.
    ///
    /// Returns the number of contacts written.
    pub fn lookup(&self, pattern: &str, format: Format, out: &mut dyn Write) -> Result<usize> {
        let contacts = self.store.lookup(pattern)?;
        write_contacts(&contacts, format, out)?;
        Ok(contacts.len())
    }

    /// Change the name associated with an address
    pub fn change_name(&self, address: &str, name: &str) -> Result<bool> {
        self.store.change_name(address, name)
    }

    /// Write every contact to `out`, ordered by `sort`.
    ///
    /// Returns the number of contacts written.
    pub fn export(&self, format: Format, sort: Sort, out: &mut dyn Write) -> Result<usize> {
        let contacts = self.store.fetch_all(sort)?;
        write_contacts(&contacts, format, out)?;
        Ok(contacts.len())
    }

    /// Import contacts from `input`.
    ///
    /// Without `replace_all` the input is merged: new addresses are added and
    /// existing ones take the imported name. With `replace_all` the store is
    /// recreated first and the first occurrence of an address wins.
    ///
    /// Returns the number of contacts added or updated.
    pub fn import(&self, input: &mut dyn Read, format: Format, replace_all: bool) -> Result<usize> {
        if replace_all {
            self.store.delete_store()?;
            self.store.create()?;
        }

        let replace = !replace_all;
        let mut stored = 0;
        let mut store_pair = |name: &str, address: &str| -> Result<()> {
            let contact = Contact::normalized(name, address);
            if !contact.has_address() {
                debug!("Skipping record without address: {:?}", name);
                return Ok(());
            }
            if self.store.upsert(&contact, &self.ignore, replace)? {
                stored += 1;
            }
            Ok(())
        };

        match format {
            Format::Csv => {
                let mut reader = csv::ReaderBuilder::new()
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(input);
                for record in reader.records() {
                    let record = match record {
                        Ok(record) => record,
                        Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => {
                            warn!("Stopping import: {}", ENCODING_HINT);
                            break;
                        }
                        Err(e) => return Err(e).context("Failed to read CSV input"),
                    };
                    match (record.get(0), record.get(1)) {
                        (Some(name), Some(address)) => store_pair(name, address)?,
                        _ => warn!("Skipping CSV row without name and address: {:?}", record),
                    }
                }
            }
            _ => {
                for line in BufReader::new(input).lines() {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                            warn!("Stopping import: {}", ENCODING_HINT);
                            break;
                        }
                        Err(e) => return Err(e).context("Failed to read input"),
                    };
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let (name, address) = decode_line(line, format)?;
                    store_pair(&name, &address)?;
                }
            }
        }

        info!("Imported {} addresses", stored);
        Ok(stored)
    }
}
