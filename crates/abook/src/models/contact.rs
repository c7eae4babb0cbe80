//! Contact model representing one address book entry

/// Characters trimmed from the edges of a display name
const NAME_TRIM: &[char] = &[';', ' '];

/// Characters trimmed from the edges of an address
const ADDRESS_TRIM: &[char] = &[';', '\'', '"', ' '];

/// A (name, address) pair stored in the address book
///
/// The address is unique within a store. The name may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Contact {
    /// Display name (e.g., "John Doe"), possibly empty
    pub name: String,
    /// Email address (e.g., "john@example.com")
    pub address: String,
}

impl Contact {
    /// Create a contact from values that are already normalized
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Create a contact from raw header or input values.
    ///
    /// The name loses surrounding `;` and spaces. The address is lowercased
    /// and loses surrounding `;`, quotes and spaces.
    pub fn normalized(name: &str, address: &str) -> Self {
        Self {
            name: name.trim_matches(NAME_TRIM).to_string(),
            address: address.to_lowercase().trim_matches(ADDRESS_TRIM).to_string(),
        }
    }

    /// Whether this contact carries an address worth storing
    pub fn has_address(&self) -> bool {
        !self.address.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_trims_and_lowercases() {
        let contact = Contact::normalized("; Jane Doe ;", " 'Jane.Doe@Example.COM'; ");
        assert_eq!(contact.name, "Jane Doe");
        assert_eq!(contact.address, "jane.doe@example.com");
    }

    #[test]
    fn test_normalized_keeps_inner_characters() {
        let contact = Contact::normalized("O'Brien; Pat", "\"pat;o@x.org\"");
        assert_eq!(contact.name, "O'Brien; Pat");
        assert_eq!(contact.address, "pat;o@x.org");
    }

    #[test]
    fn test_has_address() {
        assert!(Contact::new("", "a@x.com").has_address());
        assert!(!Contact::normalized("Nobody", " ;\" ").has_address());
    }
}
