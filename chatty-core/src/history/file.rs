//! Shell history files.
//!
//! Three line formats are understood:
//!
//! - plain bash: one command per line
//! - bash with `HISTTIMEFORMAT`: a `#<epoch>` line before each command
//! - zsh extended history: `: <epoch>:<duration>;<command>`
//!
//! zsh writes multi-line commands with a trailing backslash on every line
//! but the last; those are joined back together.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use super::{HistoryEntry, HistorySource};
use crate::error::{PolicyError, Result};

lazy_static! {
    /// `: 1700000000:0;cargo build`
    static ref ZSH_EXTENDED: Regex =
        Regex::new(r"^: *(\d+):\d+;(.*)$").expect("Invalid zsh history regex");
    /// `#1700000000` written by bash when HISTTIMEFORMAT is set
    static ref BASH_TIMESTAMP: Regex =
        Regex::new(r"^#(\d{9,})$").expect("Invalid bash timestamp regex");
}

/// A shell history file read on every lookup.
#[derive(Debug, Clone)]
pub struct ShellHistoryFile {
    path: PathBuf,
}

impl ShellHistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.bash_history`, if the home directory is known and the file exists.
    pub fn bash_default() -> Option<Self> {
        let path = dirs::home_dir()?.join(".bash_history");
        path.is_file().then(|| Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistorySource for ShellHistoryFile {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn entries(&self) -> Result<Vec<HistoryEntry>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("History file {} not found", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(PolicyError::History(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        Ok(parse_history(&String::from_utf8_lossy(&bytes)))
    }
}

fn epoch(digits: &str) -> Option<DateTime<Utc>> {
    let secs: i64 = digits.parse().ok()?;
    Utc.timestamp_opt(secs, 0).single()
}

pub(crate) fn parse_history(text: &str) -> Vec<HistoryEntry> {
    let mut entries = Vec::new();
    let mut pending_timestamp = None;
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = BASH_TIMESTAMP.captures(line) {
            pending_timestamp = epoch(&caps[1]);
            continue;
        }

        if let Some(caps) = ZSH_EXTENDED.captures(line) {
            let mut command = caps[2].to_string();
            while command.ends_with('\\') {
                command.pop();
                match lines.next() {
                    Some(next) => {
                        command.push('\n');
                        command.push_str(next);
                    }
                    None => break,
                }
            }
            entries.push(HistoryEntry::new(command, epoch(&caps[1])));
            pending_timestamp = None;
            continue;
        }

        entries.push(HistoryEntry::new(line, pending_timestamp.take()));
    }

    entries
}
