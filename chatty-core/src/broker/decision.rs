//! Decision types produced by the broker.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::{ActionId, ProposedAction};
use crate::classifier::RiskCategory;

/// Where an action is in the broker's state machine.
///
/// `Received -> Classified -> {Approved, AwaitingConfirmation, Denied}`, and
/// `AwaitingConfirmation -> {Approved, Denied}` once the human answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerState {
    Received,
    Classified,
    AwaitingConfirmation,
    Approved,
    Denied,
}

impl BrokerState {
    /// Whether no further transition can follow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BrokerState::Approved | BrokerState::Denied)
    }
}

impl std::fmt::Display for BrokerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrokerState::Received => write!(f, "received"),
            BrokerState::Classified => write!(f, "classified"),
            BrokerState::AwaitingConfirmation => write!(f, "awaiting confirmation"),
            BrokerState::Approved => write!(f, "approved"),
            BrokerState::Denied => write!(f, "denied"),
        }
    }
}

/// Opaque token naming one outstanding confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingToken(Uuid);

impl PendingToken {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PendingToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PendingToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A file-altering action proposed by the agent, waiting for the human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    /// Token to answer this request with.
    pub token: PendingToken,
    /// Id of the action awaiting confirmation.
    pub action_id: ActionId,
    /// The exact action that would run.
    pub action: ProposedAction,
    /// Why confirmation is needed.
    pub reason: RiskCategory,
}

impl ConfirmationRequest {
    /// The exact command text to show the human.
    pub fn command(&self) -> &str {
        self.action.payload()
    }
}

/// The human's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationDecision {
    Approve,
    Deny,
}

/// The human's answer to a [`ConfirmationRequest`], with an optional note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationResponse {
    pub decision: ConfirmationDecision,
    #[serde(default)]
    pub note: Option<String>,
}

impl ConfirmationResponse {
    pub fn approve() -> Self {
        Self {
            decision: ConfirmationDecision::Approve,
            note: None,
        }
    }

    pub fn deny(note: Option<String>) -> Self {
        Self {
            decision: ConfirmationDecision::Deny,
            note,
        }
    }
}

/// Category of a refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The action was malformed and never classified.
    InvalidAction,
    /// A gated capability was used without standing consent.
    ConsentMissing,
    /// The human refused the confirmation.
    ConfirmationDenied,
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialReason::InvalidAction => write!(f, "invalid action"),
            DenialReason::ConsentMissing => write!(f, "consent missing"),
            DenialReason::ConfirmationDenied => write!(f, "confirmation denied"),
        }
    }
}

/// An action the broker refused. Terminal for that action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denial {
    pub reason: DenialReason,
    /// Human-readable explanation, including guidance where there is some.
    pub message: String,
}

impl Denial {
    pub(crate) fn new(reason: DenialReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.reason, self.message)
    }
}

/// A shell command the broker approved.
///
/// Only the broker can construct one, so holding an `ApprovedCommand` proves
/// the decision table was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedCommand {
    id: ActionId,
    action: ProposedAction,
    risk: RiskCategory,
    confirmed: bool,
}

impl ApprovedCommand {
    pub(crate) fn new(
        id: ActionId,
        action: ProposedAction,
        risk: RiskCategory,
        confirmed: bool,
    ) -> Self {
        Self {
            id,
            action,
            risk,
            confirmed,
        }
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn action(&self) -> &ProposedAction {
        &self.action
    }

    pub fn command(&self) -> &str {
        self.action.payload()
    }

    /// Risk computed at decision time. The gateway does not re-classify.
    pub fn risk(&self) -> RiskCategory {
        self.risk
    }

    /// Whether the human confirmed this command explicitly.
    pub fn was_confirmed(&self) -> bool {
        self.confirmed
    }
}

/// A history lookup the broker approved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedLookup {
    id: ActionId,
    action: ProposedAction,
}

impl ApprovedLookup {
    pub(crate) fn new(id: ActionId, action: ProposedAction) -> Self {
        Self { id, action }
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn action(&self) -> &ProposedAction {
        &self.action
    }

    /// Text to search for.
    pub fn query(&self) -> &str {
        self.action.payload()
    }
}

/// An approved action, ready for the gateway or the history adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovedAction {
    Command(ApprovedCommand),
    HistoryLookup(ApprovedLookup),
}

impl ApprovedAction {
    pub fn id(&self) -> ActionId {
        match self {
            ApprovedAction::Command(c) => c.id(),
            ApprovedAction::HistoryLookup(l) => l.id(),
        }
    }

    pub fn action(&self) -> &ProposedAction {
        match self {
            ApprovedAction::Command(c) => c.action(),
            ApprovedAction::HistoryLookup(l) => l.action(),
        }
    }
}

/// The broker's decision for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// May run now.
    Approved(ApprovedAction),
    /// Needs the human's answer first.
    AwaitingConfirmation(ConfirmationRequest),
    /// Refused.
    Denied(Denial),
}

impl Decision {
    pub fn is_approved(&self) -> bool {
        matches!(self, Decision::Approved(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Decision::AwaitingConfirmation(_))
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Decision::Denied(_))
    }
}
