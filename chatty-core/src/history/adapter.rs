//! History lookups.

use std::sync::Arc;

use super::{HistoryEntry, HistorySource};
use crate::broker::ApprovedLookup;
use crate::error::Result;

/// Default cap on entries returned by one lookup.
pub const DEFAULT_MAX_HISTORY_RESULTS: usize = 50;

/// Searches the registered history sources.
///
/// Sources are read in registration order and concatenated; the session
/// registers shell history files first and its own log last, so the result
/// stays chronological.
pub struct HistoryQueryAdapter {
    sources: Vec<Arc<dyn HistorySource>>,
    max_results: usize,
}

impl HistoryQueryAdapter {
    pub fn new(max_results: usize) -> Self {
        Self {
            sources: Vec::new(),
            max_results,
        }
    }

    pub fn add_source(&mut self, source: Arc<dyn HistorySource>) {
        self.sources.push(source);
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Entries whose command contains the query, ignoring case.
    ///
    /// Read-only. When more than `max_results` entries match, the most
    /// recent ones are kept, still oldest first. A `max_results` of zero
    /// means no cap.
    pub fn lookup(&self, approved: &ApprovedLookup) -> Result<Vec<HistoryEntry>> {
        let needle = approved.query().trim().to_lowercase();
        let mut matches = Vec::new();
        for source in &self.sources {
            let entries = source.entries()?;
            log::debug!("Searching {} entries from {}", entries.len(), source.name());
            matches.extend(entries.into_iter().filter(|e| e.matches(&needle)));
        }

        if self.max_results > 0 && matches.len() > self.max_results {
            let excess = matches.len() - self.max_results;
            matches.drain(..excess);
        }
        Ok(matches)
    }
}

impl Default for HistoryQueryAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY_RESULTS)
    }
}
