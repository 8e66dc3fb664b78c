//! Working-directory snapshots used to name created paths.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};

/// How many times `max_entries` a search for recent entries may visit.
const RECENT_WALK_FACTOR: usize = 4;

/// Bounds on a snapshot walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLimits {
    /// Maximum directory depth below the working directory.
    pub depth: usize,
    /// Maximum number of entries recorded.
    pub max_entries: usize,
}

impl Default for SnapshotLimits {
    fn default() -> Self {
        Self {
            depth: 4,
            max_entries: 10_000,
        }
    }
}

/// Paths below a root, relative to it.
#[derive(Debug, Clone, Default)]
pub(crate) struct Snapshot {
    entries: BTreeSet<PathBuf>,
    truncated: bool,
}

impl Snapshot {
    /// Walk `root`, including hidden and ignored files.
    pub(crate) fn capture(root: &Path, limits: SnapshotLimits) -> Self {
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .max_depth(Some(limits.depth))
            .build();

        let mut snapshot = Snapshot::default();
        for entry in walker {
            let Ok(entry) = entry else {
                continue;
            };
            if entry.depth() == 0 {
                continue;
            }
            if snapshot.entries.len() >= limits.max_entries {
                snapshot.truncated = true;
                break;
            }
            if let Ok(relative) = entry.path().strip_prefix(root) {
                snapshot.entries.insert(relative.to_path_buf());
            }
        }
        snapshot
    }

    /// Whether the walk stopped at the entry limit.
    pub(crate) fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Entries below `root` missing from this snapshot that came into being
    /// at or after `since`, parents first.
    ///
    /// Walks without a depth bound and stops after `RECENT_WALK_FACTOR`
    /// times the entry limit. Uses birth time where the platform records
    /// it, otherwise the modification time of anything but a directory.
    pub(crate) fn recent_entries(
        &self,
        root: &Path,
        since: SystemTime,
        limits: SnapshotLimits,
    ) -> Vec<PathBuf> {
        let budget = limits.max_entries.saturating_mul(RECENT_WALK_FACTOR);
        let walker = WalkBuilder::new(root).standard_filters(false).build();

        let mut found = BTreeSet::new();
        for (seen, entry) in walker.enumerate() {
            if seen >= budget {
                log::debug!("Stopped looking for new entries after {} entries", budget);
                break;
            }
            let Ok(entry) = entry else {
                continue;
            };
            if entry.depth() == 0 {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            if self.entries.contains(relative) {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let stamp = match metadata.created() {
                Ok(created) => Some(created),
                Err(_) if !metadata.is_dir() => metadata.modified().ok(),
                Err(_) => None,
            };
            if stamp.is_some_and(|stamp| stamp >= since) {
                found.insert(relative.to_path_buf());
            }
        }
        found.into_iter().collect()
    }

    /// Entries present here but not in `before`, parents first.
    pub(crate) fn added_since(&self, before: &Snapshot) -> Vec<PathBuf> {
        self.entries.difference(&before.entries).cloned().collect()
    }
}
