//! Text formats for contacts
//!
//! Output formats:
//! - `abook` - `ADDRESS<Tab>NAME`, easy to parse from other programs
//! - `csv` - `NAME,ADDRESS` with CSV quoting
//! - `email` - `NAME <ADDRESS>`, ready to paste into a mail header
//!
//! `abook` and `email` can also be decoded line by line. CSV input is read
//! row by row by the import action instead.

use anyhow::Result;
use mailparse::{MailAddr, addrparse};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::models::Contact;

/// Error for an unknown format or sort option
#[derive(Debug, thiserror::Error)]
#[error("Unknown format: {0}")]
pub struct InvalidOptionError(pub String);

/// Line format for contacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    Abook,
    Csv,
    #[default]
    Email,
}

impl Format {
    /// All formats, in the order they are documented
    pub const ALL: [Format; 3] = [Format::Abook, Format::Csv, Format::Email];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Abook => "abook",
            Format::Csv => "csv",
            Format::Email => "email",
        }
    }
}

impl FromStr for Format {
    type Err = InvalidOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| InvalidOptionError(s.to_string()))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field to order exported contacts by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sort {
    #[default]
    Name,
    Address,
}

impl FromStr for Sort {
    type Err = InvalidOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Sort::Name),
            "address" => Ok(Sort::Address),
            other => Err(InvalidOptionError(other.to_string())),
        }
    }
}

/// Characters that force a display name into quotes
const SPECIALS: &[char] = &['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"'];

/// Format a name and address as `Name <address>`, quoting the name if needed
fn format_mailbox(name: &str, address: &str) -> String {
    if name.is_empty() {
        return address.to_string();
    }

    if name.contains(SPECIALS) {
        let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{}\" <{}>", escaped, address)
    } else {
        format!("{} <{}>", name, address)
    }
}

/// Format one contact as a single line (without the newline).
///
/// CSV is not line based and is rejected here; use [`write_contacts`].
pub fn format_contact(contact: &Contact, format: Format) -> Result<String, InvalidOptionError> {
    match format {
        Format::Abook => Ok(format!("{}\t{}", contact.address, contact.name)),
        Format::Email => Ok(format_mailbox(&contact.name, &contact.address)),
        Format::Csv => Err(InvalidOptionError(format.to_string())),
    }
}

/// Decode one input line into a (name, address) pair.
///
/// An `email` line that cannot be parsed decodes to an empty pair.
pub fn decode_line(line: &str, format: Format) -> Result<(String, String), InvalidOptionError> {
    match format {
        Format::Abook => Ok(match line.split_once('\t') {
            Some((address, name)) => (name.to_string(), address.to_string()),
            None => (String::new(), line.to_string()),
        }),
        Format::Email => Ok(parse_mailbox(line).unwrap_or_default()),
        Format::Csv => Err(InvalidOptionError(format.to_string())),
    }
}

/// First mailbox of a display-form address string
fn parse_mailbox(line: &str) -> Option<(String, String)> {
    let info = addrparse(line)
        .ok()?
        .into_inner()
        .into_iter()
        .find_map(|addr| match addr {
            MailAddr::Single(info) => Some(info),
            MailAddr::Group(group) => group.addrs.into_iter().next(),
        })?;

    let name = info.display_name.unwrap_or_default().trim().to_string();
    Some((name, info.addr))
}

/// Write contacts to `out` in the given format, one per line
pub fn write_contacts(contacts: &[Contact], format: Format, out: &mut dyn Write) -> Result<()> {
    match format {
        Format::Csv => {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(out);
            for contact in contacts {
                writer.write_record([&contact.name, &contact.address])?;
            }
            writer.flush()?;
        }
        _ => {
            for contact in contacts {
                writeln!(out, "{}", format_contact(contact, format)?)?;
            }
            out.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(contacts: &[Contact], format: Format) -> String {
        let mut out = Vec::new();
        write_contacts(contacts, format, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("abook".parse::<Format>().unwrap(), Format::Abook);
        assert_eq!("csv".parse::<Format>().unwrap(), Format::Csv);
        assert_eq!("email".parse::<Format>().unwrap(), Format::Email);
        let err = "vcard".parse::<Format>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown format: vcard");
        assert_eq!(Format::default(), Format::Email);
    }

    #[test]
    fn test_sort_from_str() {
        assert_eq!("name".parse::<Sort>().unwrap(), Sort::Name);
        assert_eq!("address".parse::<Sort>().unwrap(), Sort::Address);
        assert!("date".parse::<Sort>().is_err());
    }

    #[test]
    fn test_format_abook() {
        let contact = Contact::new("Alice", "alice@x.com");
        assert_eq!(format_contact(&contact, Format::Abook).unwrap(), "alice@x.com\tAlice");
    }

    #[test]
    fn test_format_email() {
        let plain = Contact::new("Alice Smith", "alice@x.com");
        assert_eq!(
            format_contact(&plain, Format::Email).unwrap(),
            "Alice Smith <alice@x.com>"
        );

        let nameless = Contact::new("", "alice@x.com");
        assert_eq!(format_contact(&nameless, Format::Email).unwrap(), "alice@x.com");

        let special = Contact::new("Smith, J. \"Jo\"", "jo@x.com");
        assert_eq!(
            format_contact(&special, Format::Email).unwrap(),
            r#""Smith, J. \"Jo\"" <jo@x.com>"#
        );
    }

    #[test]
    fn test_format_csv_is_not_line_based() {
        let contact = Contact::new("Alice", "alice@x.com");
        assert!(format_contact(&contact, Format::Csv).is_err());
        assert!(decode_line("Alice,alice@x.com", Format::Csv).is_err());
    }

    #[test]
    fn test_decode_abook() {
        assert_eq!(
            decode_line("alice@x.com\tAlice Smith", Format::Abook).unwrap(),
            ("Alice Smith".to_string(), "alice@x.com".to_string())
        );
        assert_eq!(
            decode_line("alice@x.com", Format::Abook).unwrap(),
            (String::new(), "alice@x.com".to_string())
        );
    }

    #[test]
    fn test_decode_email() {
        assert_eq!(
            decode_line("Carol <c@z.com>", Format::Email).unwrap(),
            ("Carol".to_string(), "c@z.com".to_string())
        );
        assert_eq!(
            decode_line("c@z.com", Format::Email).unwrap(),
            (String::new(), "c@z.com".to_string())
        );
        assert_eq!(
            decode_line("not an address", Format::Email).unwrap(),
            (String::new(), String::new())
        );
    }

    #[test]
    fn test_line_formats_round_trip() {
        let contacts = [
            Contact::new("Alice Smith", "alice@x.com"),
            Contact::new("", "bare@x.com"),
            Contact::new("Smith, J.", "jsmith@x.com"),
        ];

        for format in [Format::Abook, Format::Email] {
            for contact in &contacts {
                let line = format_contact(contact, format).unwrap();
                let (name, address) = decode_line(&line, format).unwrap();
                assert_eq!(Contact::new(name, address), *contact, "format {}", format);
            }
        }
    }

    #[test]
    fn test_write_csv() {
        let contacts = [
            Contact::new("Alice", "alice@x.com"),
            Contact::new("Smith, John", "john@x.com"),
        ];
        assert_eq!(
            render(&contacts, Format::Csv),
            "Alice,alice@x.com\n\"Smith, John\",john@x.com\n"
        );
    }

    #[test]
    fn test_write_lines() {
        let contacts = [Contact::new("Alice", "alice@x.com"), Contact::new("", "b@y.com")];
        assert_eq!(
            render(&contacts, Format::Email),
            "Alice <alice@x.com>\nb@y.com\n"
        );
        assert_eq!(
            render(&contacts, Format::Abook),
            "alice@x.com\tAlice\nb@y.com\t\n"
        );
    }
}
