//! Proposed actions submitted by the agent or the human.
//!
//! A [`ProposedAction`] is immutable once created. The broker validates it,
//! classifies it, and decides whether it may run.

use serde::{Deserialize, Serialize};

/// What kind of action is being proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Run a command string in the live shell session.
    ShellCommand,
    /// Search the session's command history.
    HistoryLookup,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::ShellCommand => write!(f, "shell command"),
            ActionKind::HistoryLookup => write!(f, "history lookup"),
        }
    }
}

/// Who asked for the action.
///
/// `UserExplicit` means the human directly instructed this exact action.
/// Destructive commands with that origin skip the confirmation round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// The agent inferred the action on its own.
    #[default]
    AgentInferred,
    /// The human typed or dictated this exact action.
    UserExplicit,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::AgentInferred => write!(f, "agent"),
            Origin::UserExplicit => write!(f, "user"),
        }
    }
}

/// An action the agent (or the human) wants to take.
///
/// # Example
///
/// ```rust
/// use chatty_core::{ActionKind, Origin, ProposedAction};
///
/// let action = ProposedAction::shell("ls -la", Origin::AgentInferred);
/// assert_eq!(action.kind(), ActionKind::ShellCommand);
/// assert_eq!(action.payload(), "ls -la");
///
/// let lookup = ProposedAction::history_lookup("git");
/// assert_eq!(lookup.kind(), ActionKind::HistoryLookup);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedAction {
    kind: ActionKind,
    payload: String,
    #[serde(default)]
    origin: Origin,
}

impl ProposedAction {
    /// Create a new proposed action.
    pub fn new(kind: ActionKind, payload: impl Into<String>, origin: Origin) -> Self {
        Self {
            kind,
            payload: payload.into(),
            origin,
        }
    }

    /// Propose a shell command.
    pub fn shell(command: impl Into<String>, origin: Origin) -> Self {
        Self::new(ActionKind::ShellCommand, command, origin)
    }

    /// Propose a history lookup. Origin does not affect the consent check.
    pub fn history_lookup(query: impl Into<String>) -> Self {
        Self::new(ActionKind::HistoryLookup, query, Origin::AgentInferred)
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Check that the action is well formed.
    ///
    /// Returns a human-readable reason when it is not.
    pub fn validate(&self) -> Result<(), String> {
        if self.payload.trim().is_empty() {
            return Err(format!("{} payload must not be empty", self.kind));
        }
        if self.payload.contains('\0') {
            return Err(format!("{} payload contains a NUL byte", self.kind));
        }
        Ok(())
    }
}

/// Session-local identifier assigned to each received action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub u64);

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
