//! Domain models for address book entities

mod contact;

pub use contact::Contact;
