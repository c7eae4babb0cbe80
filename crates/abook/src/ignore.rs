//! Ignore rules for addresses that must never enter the address book
//!
//! Rules come from an ignore file, one rule per line:
//! - blank lines and lines starting with `#` are skipped
//! - `/pattern/` is a case-insensitive regular expression
//! - anything else is a literal, case-sensitive substring
//!
//! Rules are loaded once at startup and passed to whoever needs them.

use anyhow::{Context, Result};
use log::debug;
use regex::{Regex, RegexBuilder};
use std::path::Path;

/// Compiled ignore rules
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    substrings: Vec<String>,
    regexes: Vec<Regex>,
}

impl IgnoreRules {
    /// Rules that ignore nothing (no ignore file configured)
    pub fn none() -> Self {
        Self::default()
    }

    /// Load rules from the optional ignore file.
    ///
    /// `None` yields empty rules. A configured but unreadable file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::none());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ignore file: {}", path.display()))?;
        let rules = Self::parse(&content)
            .with_context(|| format!("Invalid rule in ignore file: {}", path.display()))?;

        debug!(
            "Loaded {} substring and {} regex ignore rules from {}",
            rules.substrings.len(),
            rules.regexes.len(),
            path.display()
        );
        Ok(rules)
    }

    /// Parse rules from ignore file content
    pub fn parse(content: &str) -> Result<Self> {
        let mut rules = Self::none();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line
                .strip_prefix('/')
                .and_then(|rest| rest.strip_suffix('/'))
            {
                Some(pattern) => {
                    let regex = RegexBuilder::new(pattern)
                        .case_insensitive(true)
                        .build()
                        .with_context(|| format!("Bad regular expression: {}", line))?;
                    rules.regexes.push(regex);
                }
                None => rules.substrings.push(line.to_string()),
            }
        }

        Ok(rules)
    }

    /// Check if this address should be ignored
    pub fn matches(&self, address: &str) -> bool {
        self.substrings.iter().any(|s| address.contains(s.as_str()))
            || self.regexes.iter().any(|r| r.is_match(address))
    }
}
