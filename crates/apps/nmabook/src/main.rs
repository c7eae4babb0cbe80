//! nmabook - Address book for notmuch
//!
//! This is the main entry point for the nmabook command line tool.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::process::ExitCode;

use abook::{AbookSettings, ActionHandler, Format, IgnoreRules};
use anyhow::{Context, Result};
use log::debug;

mod cli;

use cli::{Cli, Command};

/// Exit status when a command fails
const EXIT_FAILURE: u8 = 1;
/// Exit status when --format names an unknown format
const EXIT_INVALID_FORMAT: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::from_args();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();

    ExitCode::from(execute(&cli, &mut io::stderr()))
}

/// Run the parsed command line, reporting failures to `errors`.
///
/// Returns the process exit status.
fn execute(cli: &Cli, errors: &mut dyn Write) -> u8 {
    let Ok(format) = cli.format.parse::<Format>() else {
        let _ = writeln!(errors, "{} is not a valid output option.", cli.format);
        return EXIT_INVALID_FORMAT;
    };

    match run(cli, format) {
        Ok(()) => 0,
        Err(e) => {
            let _ = if cli.verbose {
                writeln!(errors, "Error: {:?}", e)
            } else {
                writeln!(errors, "{:#}", e)
            };
            EXIT_FAILURE
        }
    }
}

fn run(cli: &Cli, format: Format) -> Result<()> {
    let settings = AbookSettings::load(cli.config.as_deref())?;
    debug!("Using address book at {}", settings.store_path.display());

    let ignore = IgnoreRules::load(settings.ignore_file.as_deref())?;
    let handler = ActionHandler::new(settings.store(), ignore);

    match &cli.command {
        Command::Create => {
            let index = settings.mail_index()?;
            let added = handler.create(&index)?;
            println!("added {} addresses", added);
        }
        Command::Update => {
            let mut raw = Vec::new();
            io::stdin()
                .read_to_end(&mut raw)
                .context("Failed to read mail from stdin")?;
            let added = handler.update(&raw)?;
            if cli.verbose {
                println!("added {} addresses", added);
            }
        }
        Command::Lookup { pattern } => {
            let stdout = io::stdout();
            handler.lookup(pattern, format, &mut stdout.lock())?;
        }
        Command::Changename { address, name } => {
            handler.change_name(address, name)?;
        }
        Command::Export { filename } => {
            let mut out: Box<dyn Write> = match filename {
                Some(path) => Box::new(BufWriter::new(File::create(path).with_context(
                    || format!("Failed to create export file: {}", path.display()),
                )?)),
                None => Box::new(io::stdout().lock()),
            };
            handler.export(format, cli.sort, &mut out)?;
        }
        Command::Import { filename } => {
            let mut input: Box<dyn Read> = match filename {
                Some(path) => Box::new(File::open(path).with_context(|| {
                    format!("Failed to open import file: {}", path.display())
                })?),
                None => Box::new(io::stdin().lock()),
            };
            handler.import(&mut input, format, cli.replace)?;
        }
    }

    Ok(())
}
