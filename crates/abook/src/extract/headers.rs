//! Header access capability

use log::warn;
use mailparse::{MailAddr, MailHeaderMap, ParsedMail, addrparse, addrparse_header};

/// A mailbox as found in a header: (display name, address), both unnormalized
pub type Mailbox = (String, String);

/// Anything that can answer "what is the value of header X?"
pub trait HeaderSource {
    /// Get the first value of a header, matched case-insensitively
    fn header(&self, name: &str) -> Option<String>;

    /// Mailboxes listed in an address header.
    ///
    /// Values are taken as already decoded, so a display name may hold an
    /// unquoted comma. Sources that keep the raw header should override this.
    fn addresses(&self, name: &str) -> Vec<Mailbox> {
        self.header(name)
            .map(|value| parse_address_list(&value))
            .unwrap_or_default()
    }
}

impl HeaderSource for ParsedMail<'_> {
    fn header(&self, name: &str) -> Option<String> {
        self.headers.get_first_value(name)
    }

    // Encoded words are decoded after the list is split, so a comma inside
    // an encoded display name stays part of the name
    fn addresses(&self, name: &str) -> Vec<Mailbox> {
        let Some(header) = self.headers.get_first_header(name) else {
            return Vec::new();
        };
        match addrparse_header(header) {
            Ok(list) => mailboxes(list.into_inner()),
            Err(_) => parse_address_list(&header.get_value()),
        }
    }
}

impl<T: HeaderSource + ?Sized> HeaderSource for &T {
    fn header(&self, name: &str) -> Option<String> {
        (**self).header(name)
    }

    fn addresses(&self, name: &str) -> Vec<Mailbox> {
        (**self).addresses(name)
    }
}

/// Parse a decoded address list, recovering what a strict parse rejects
///
/// When the whole list does not parse, it is cut at commas that follow an
/// address, outside quotes and angle brackets, and each piece is parsed on
/// its own. A piece that still fails is read as `name <address>` or a bare
/// address.
fn parse_address_list(value: &str) -> Vec<Mailbox> {
    if value.trim().is_empty() {
        return Vec::new();
    }
    if let Ok(list) = addrparse(value) {
        return mailboxes(list.into_inner());
    }

    split_list(value)
        .into_iter()
        .filter_map(|piece| match addrparse(piece) {
            Ok(list) => Some(mailboxes(list.into_inner())),
            Err(e) => match loose_mailbox(piece) {
                Some(mailbox) => Some(vec![mailbox]),
                None => {
                    warn!("Skipping unparsable address {:?}: {}", piece, e);
                    None
                }
            },
        })
        .flatten()
        .collect()
}

/// Flatten parsed addresses, expanding groups into their members
fn mailboxes(addrs: Vec<MailAddr>) -> Vec<Mailbox> {
    let mut found = Vec::new();
    for addr in addrs {
        match addr {
            MailAddr::Single(info) => {
                found.push((info.display_name.unwrap_or_default(), info.addr));
            }
            MailAddr::Group(group) => found.extend(
                group
                    .addrs
                    .into_iter()
                    .map(|info| (info.display_name.unwrap_or_default(), info.addr)),
            ),
        }
    }
    found
}

/// Cut an address list at commas that end an address
fn split_list(value: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    let mut in_angle = false;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '<' if !in_quotes => in_angle = true,
            '>' if !in_quotes => in_angle = false,
            ',' if !in_quotes && !in_angle && value[start..i].contains('@') => {
                pieces.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&value[start..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Read `name <address>` or a bare address without any RFC 5322 rules
fn loose_mailbox(piece: &str) -> Option<Mailbox> {
    let bracketed = piece
        .strip_suffix('>')
        .and_then(|rest| rest.rfind('<').map(|open| (&rest[..open], &rest[open + 1..])));
    if let Some((name, address)) = bracketed {
        let name = name.trim().trim_matches('"').trim();
        let address = address.trim();
        return address
            .contains('@')
            .then(|| (name.to_string(), address.to_string()));
    }
    piece
        .contains('@')
        .then(|| (String::new(), piece.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailparse::parse_mail;

    fn pair(name: &str, address: &str) -> Mailbox {
        (name.to_string(), address.to_string())
    }

    #[test]
    fn test_parsed_mail_headers() {
        let raw = b"From: Alice <alice@x.com>\nTO: bob@y.com\nSubject: hi\n\nbody\n";
        let mail = parse_mail(raw).unwrap();
        assert_eq!(mail.header("from").as_deref(), Some("Alice <alice@x.com>"));
        assert_eq!(mail.header("To").as_deref(), Some("bob@y.com"));
        assert_eq!(mail.header("cc"), None);
    }

    #[test]
    fn test_encoded_comma_in_raw_header() {
        let raw = b"From: =?utf-8?q?Doe=2C_John?= <john@x.com>, amy@a.com\n\nbody\n";
        let mail = parse_mail(raw).unwrap();
        assert_eq!(
            mail.addresses("from"),
            vec![pair("Doe, John", "john@x.com"), pair("", "amy@a.com")]
        );
        assert!(mail.addresses("to").is_empty());
    }

    #[test]
    fn test_well_formed_list() {
        assert_eq!(
            parse_address_list("Ann <ann@t.com>, \"Lee, B.\" <b@t.com>, c@t.com"),
            vec![
                pair("Ann", "ann@t.com"),
                pair("Lee, B.", "b@t.com"),
                pair("", "c@t.com"),
            ]
        );
    }

    #[test]
    fn test_decoded_comma_in_display_name() {
        assert_eq!(
            parse_address_list("Doe, John <john@x.com>, amy@a.com"),
            vec![pair("Doe, John", "john@x.com"), pair("", "amy@a.com")]
        );
    }

    #[test]
    fn test_pieces_without_address_are_dropped() {
        assert!(parse_address_list("nobody here").is_empty());
        assert!(parse_address_list("   ").is_empty());
    }

    #[test]
    fn test_split_list_respects_quotes_and_brackets() {
        assert_eq!(
            split_list("\"a, b\" <a@x>, Doe, J <j@x>,c@x"),
            vec!["\"a, b\" <a@x>", "Doe, J <j@x>", "c@x"]
        );
    }
}
