//! Consent grant types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A capability that requires standing consent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Reading the session's command history.
    HistoryLookup,
}

impl Capability {
    /// All known capabilities.
    pub const ALL: &'static [Capability] = &[Capability::HistoryLookup];

    /// Parse the short name used on the command line (`history`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "history" | "history_lookup" | "history-lookup" => Some(Capability::HistoryLookup),
            _ => None,
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::HistoryLookup => write!(f, "history lookup"),
        }
    }
}

/// A recorded consent grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentGrant {
    /// Capability this grant applies to.
    pub capability: Capability,

    /// When the human granted it.
    pub granted_at: DateTime<Utc>,
}

impl ConsentGrant {
    /// Create a grant stamped with the current time.
    pub fn new(capability: Capability) -> Self {
        Self {
            capability,
            granted_at: Utc::now(),
        }
    }
}
