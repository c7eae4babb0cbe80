//! Notmuch mail index
//!
//! Talks to notmuch through its command line tool. `notmuch show` prints
//! matching messages as nested JSON (threads of message/replies pairs),
//! with headers already decoded.

use anyhow::{Context, Result, bail};
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::MailIndex;
use crate::extract::HeaderSource;

/// A message as reported by the mail index
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexedMessage {
    /// Index message ID
    #[serde(default)]
    pub id: String,
    /// Decoded headers, keyed by header name
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl IndexedMessage {
    /// Build a message from (header, value) pairs
    pub fn new(id: &str, headers: &[(&str, &str)]) -> Self {
        Self {
            id: id.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl HeaderSource for IndexedMessage {
    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    }
}

/// Mail index backed by the `notmuch` command line tool
#[derive(Debug, Clone)]
pub struct NotmuchIndex {
    program: PathBuf,
    config_path: Option<PathBuf>,
    database_path: PathBuf,
}

impl NotmuchIndex {
    /// Default name of the notmuch executable
    const PROGRAM: &'static str = "notmuch";

    /// Create an index for the notmuch database at `database_path`
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from(Self::PROGRAM),
            config_path: None,
            database_path: database_path.into(),
        }
    }

    /// Pass this config file to notmuch
    pub fn with_config(mut self, config_path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(config_path.into());
        self
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }
}

impl MailIndex for NotmuchIndex {
    fn search(&self, query: &str) -> Result<Vec<IndexedMessage>> {
        if !self.database_path.exists() {
            bail!(
                "Mail database '{}' does not exist",
                self.database_path.display()
            );
        }

        let mut cmd = Command::new(&self.program);
        if let Some(config) = &self.config_path {
            cmd.arg(format!("--config={}", config.display()));
        }
        cmd.args([
            "show",
            "--format=json",
            "--entire-thread=false",
            "--body=false",
            query,
        ])
        .env("NOTMUCH_DATABASE", &self.database_path);

        debug!("Running {:?}", cmd);
        let output = cmd
            .output()
            .with_context(|| format!("Failed to run {}", self.program.display()))?;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let messages = parse_show_output(&output.stdout)?;
        info!("Mail index returned {} messages", messages.len());
        Ok(messages)
    }
}

/// Parse the JSON printed by `notmuch show --format=json`
fn parse_show_output(json: &[u8]) -> Result<Vec<IndexedMessage>> {
    let value: Value =
        serde_json::from_slice(json).context("Failed to parse notmuch JSON output")?;

    let mut messages = Vec::new();
    collect_messages(value, &mut messages)?;
    Ok(messages)
}

/// Walk threads and reply trees, collecting matching message objects
fn collect_messages(value: Value, out: &mut Vec<IndexedMessage>) -> Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_messages(item, out)?;
            }
        }
        Value::Object(map) if map.contains_key("headers") => {
            // Context messages of a thread are reported with match=false
            if map.get("match").and_then(Value::as_bool) == Some(false) {
                return Ok(());
            }
            let message: IndexedMessage = serde_json::from_value(Value::Object(map))
                .context("Unexpected message object in notmuch output")?;
            out.push(message);
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_OUTPUT: &str = r#"[
      [
        [
          {
            "id": "m1@x",
            "match": true,
            "excluded": false,
            "tags": ["inbox"],
            "headers": {"Subject": "hi", "From": "Alice <alice@x.com>", "To": "bob@y.com"}
          },
          [
            [
              {
                "id": "m2@x",
                "match": true,
                "headers": {"From": "bob@y.com", "To": "Alice <alice@x.com>", "Cc": "carol@z.com"}
              },
              []
            ]
          ]
        ]
      ],
      [
        [
          null,
          [
            [
              {"id": "m3@x", "match": false, "headers": {"From": "hidden@x.com"}},
              []
            ]
          ]
        ]
      ]
    ]"#;

    #[test]
    fn test_parse_show_output() {
        let messages = parse_show_output(SHOW_OUTPUT.as_bytes()).unwrap();
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1@x", "m2@x"]);
        assert_eq!(messages[1].header("cc").as_deref(), Some("carol@z.com"));
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_show_output(b"[]").unwrap().is_empty());
        assert!(parse_show_output(b"not json").is_err());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let message = IndexedMessage::new("m", &[("From", "a@x.com"), ("BCC", "b@x.com")]);
        assert_eq!(message.header("from").as_deref(), Some("a@x.com"));
        assert_eq!(message.header("Bcc").as_deref(), Some("b@x.com"));
        assert_eq!(message.header("to"), None);
    }

    #[test]
    fn test_missing_database() {
        let dir = tempfile::tempdir().unwrap();
        let index = NotmuchIndex::new(dir.path().join("no-mail"));
        let err = index.search(crate::index::EXCLUDE_QUERY).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
