//! The session's own command log.

use chrono::Utc;
use parking_lot::RwLock;

use super::{HistoryEntry, HistorySource};
use crate::error::Result;

/// Append-only log of commands executed through this session.
///
/// Only the execution gateway appends to it.
#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&self, command: impl Into<String>) {
        self.entries
            .write()
            .push(HistoryEntry::new(command, Some(Utc::now())));
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl HistorySource for SessionHistory {
    fn name(&self) -> String {
        "session".to_string()
    }

    fn entries(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.entries.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_order_and_timestamps() {
        let history = SessionHistory::new();
        assert!(history.is_empty());

        history.append("ls");
        history.append("git status");

        let entries = history.entries().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(entries[0].command, "ls");
        assert_eq!(entries[1].command, "git status");
        assert!(entries.iter().all(|e| e.timestamp.is_some()));
        assert!(entries[0].timestamp <= entries[1].timestamp);
    }
}
