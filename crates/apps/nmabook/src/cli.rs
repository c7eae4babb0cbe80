//! Command-line interface definition

use abook::Sort;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Address book for notmuch, built from your mail.
///
/// Formats (--format):
///   abook - EMAIL<Tab>NAME, easy to parse from other programs
///   csv   - NAME,EMAIL as comma separated values
///   email - NAME <EMAIL>, for composing mail
///
/// The address book location is read from the notmuch config file.
#[derive(Parser, Debug)]
#[command(author, version, verbatim_doc_comment)]
pub struct Cli {
    /// Show the full error chain on failure
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to notmuch configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Format for name/address: abook, csv or email
    #[arg(short, long, value_name = "FORMAT", default_value = "email", global = true)]
    pub format: String,

    /// Whether to sort by name or address
    #[arg(short, long, value_name = "SORT", default_value = "name", global = true)]
    pub sort: Sort,

    /// Replace the current contents with the imported contents instead of merging
    #[arg(short, long, global = true)]
    pub replace: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a new address book from the mail database
    Create,
    /// Update the address book with a new mail (read from stdin)
    Update,
    /// Look up addresses; the match can be an address or part of a name
    Lookup {
        #[arg(value_name = "MATCH")]
        pattern: String,
    },
    /// Change the name associated with an address
    Changename { address: String, name: String },
    /// Export the address book to a file, or stdout if none given
    Export { filename: Option<PathBuf> },
    /// Import into the address book from a file, or stdin if none given
    Import { filename: Option<PathBuf> },
}

impl Cli {
    /// Parse CLI arguments from process args.
    pub fn from_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["nmabook", "create"]).unwrap();
        assert_eq!(cli.command, Command::Create);
        assert_eq!(cli.format, "email");
        assert_eq!(cli.sort, Sort::Name);
        assert!(!cli.verbose && !cli.replace);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_options_after_verb() {
        let cli = Cli::try_parse_from([
            "nmabook", "export", "-f", "csv", "--sort", "address", "out.csv",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Export {
                filename: Some(PathBuf::from("out.csv"))
            }
        );
        assert_eq!(cli.format, "csv");
        assert_eq!(cli.sort, Sort::Address);
    }

    #[test]
    fn test_changename_args() {
        let cli = Cli::try_parse_from([
            "nmabook", "-v", "-c", "/tmp/cfg", "changename", "a@x.com", "Ann Other",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/cfg")));
        assert_eq!(
            cli.command,
            Command::Changename {
                address: "a@x.com".to_string(),
                name: "Ann Other".to_string()
            }
        );
    }

    #[test]
    fn test_import_replace() {
        let cli = Cli::try_parse_from(["nmabook", "import", "-r"]).unwrap();
        assert!(cli.replace);
        assert_eq!(cli.command, Command::Import { filename: None });
    }

    #[test]
    fn test_bad_sort_is_usage_error() {
        let err = Cli::try_parse_from(["nmabook", "export", "--sort", "date"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_lookup_requires_match() {
        assert!(Cli::try_parse_from(["nmabook", "lookup"]).is_err());
    }
}
