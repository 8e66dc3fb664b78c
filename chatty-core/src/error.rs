//! Engine error types.
//!
//! Denials are not errors: an action the broker refuses comes back as a
//! [`Denial`](crate::broker::Denial) inside a normal result. [`PolicyError`]
//! covers misuse of the protocol and failures of the session's surroundings.

use thiserror::Error;

use crate::action::ActionId;
use crate::broker::PendingToken;

/// Errors raised by the policy engine.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A new action was submitted while another awaits confirmation.
    #[error("action {pending} is awaiting confirmation; answer it before proposing another action")]
    ConfirmationPending {
        /// The action that is still waiting.
        pending: ActionId,
    },

    /// The token does not name the outstanding confirmation.
    #[error("no pending confirmation matches token {0}")]
    UnknownConfirmation(PendingToken),

    /// Cancel was requested but nothing is pending.
    #[error("no confirmation is pending")]
    NothingPending,

    /// A history source could not be read.
    #[error("history unavailable: {0}")]
    History(String),

    /// The session could not be set up.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PolicyError {
    /// Whether the error is a protocol misuse the caller can recover from by
    /// answering or cancelling the pending confirmation.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            PolicyError::ConfirmationPending { .. }
                | PolicyError::UnknownConfirmation(_)
                | PolicyError::NothingPending
        )
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, PolicyError>;
