//! Session configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::broker::DEFAULT_CONSENT_GUIDANCE;
use crate::gateway::SnapshotLimits;
use crate::history::DEFAULT_MAX_HISTORY_RESULTS;

/// Default shell program.
pub const DEFAULT_SHELL: &str = "sh";

/// Settings for one session.
///
/// Every field has a default, so a partial JSON document deserializes.
///
/// ```rust
/// use chatty_core::SessionConfig;
///
/// let config: SessionConfig = serde_json::from_str(r#"{"shell": "bash"}"#).unwrap();
/// assert_eq!(config.shell, "bash");
/// assert_eq!(config.max_history_results, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Program that runs commands as `<shell> -c <command>`.
    pub shell: String,
    /// Starting directory; the process's current directory when unset.
    pub working_dir: Option<PathBuf>,
    /// Shell history files searched before the session's own log.
    pub history_files: Vec<PathBuf>,
    /// Cap on entries returned by one history lookup; zero means no cap.
    pub max_history_results: usize,
    /// Depth of the working-directory snapshot for created paths.
    pub snapshot_depth: usize,
    /// Entry limit of that snapshot.
    pub snapshot_limit: usize,
    /// Shown when a history lookup is denied for lack of consent.
    pub consent_guidance: String,
}

impl SessionConfig {
    pub fn snapshot_limits(&self) -> SnapshotLimits {
        SnapshotLimits {
            depth: self.snapshot_depth,
            max_entries: self.snapshot_limit,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        let limits = SnapshotLimits::default();
        Self {
            shell: DEFAULT_SHELL.to_string(),
            working_dir: None,
            history_files: Vec::new(),
            max_history_results: DEFAULT_MAX_HISTORY_RESULTS,
            snapshot_depth: limits.depth,
            snapshot_limit: limits.max_entries,
            consent_guidance: DEFAULT_CONSENT_GUIDANCE.to_string(),
        }
    }
}
