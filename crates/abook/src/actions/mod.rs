//! Command actions
//!
//! Provides the operations behind each command line verb.

mod handler;

pub use handler::ActionHandler;
