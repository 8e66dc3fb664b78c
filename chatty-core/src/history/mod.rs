//! Command history and the history query adapter.
//!
//! History is read through [`HistorySource`]. A session always has its own
//! [`SessionHistory`], which the gateway appends to after every execution,
//! and may add shell history files such as `~/.bash_history`.
//!
//! [`HistoryQueryAdapter::lookup`] only accepts an
//! [`ApprovedLookup`](crate::broker::ApprovedLookup), so a
//! lookup cannot happen without the broker's consent check.

mod adapter;
mod file;
mod session;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use adapter::{HistoryQueryAdapter, DEFAULT_MAX_HISTORY_RESULTS};
pub use file::ShellHistoryFile;
pub use session::SessionHistory;

/// One command from a history source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub command: String,
    /// When the command ran, if the source records it.
    pub timestamp: Option<DateTime<Utc>>,
}

impl HistoryEntry {
    pub fn new(command: impl Into<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            command: command.into(),
            timestamp,
        }
    }

    /// Case-insensitive substring match against the command text.
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.command.to_lowercase().contains(needle_lowercase)
    }
}

/// A readable store of past commands, oldest first.
pub trait HistorySource: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> String;

    /// All entries in chronological order.
    fn entries(&self) -> Result<Vec<HistoryEntry>>;
}
