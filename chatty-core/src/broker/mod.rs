//! The permission broker.
//!
//! Every proposed action passes through [`PermissionBroker`], which
//! classifies it and decides whether it may run.
//!
//! # Overview
//!
//! - **[`Decision`]**: What the broker decided for one action
//! - **[`ApprovedAction`]**: Proof of approval; only the broker creates one
//! - **[`ConfirmationRequest`]**: A file-altering agent action awaiting the human
//! - **[`Denial`]**: Why an action was refused
//!
//! # Decision Table
//!
//! | Action | Origin | Decision |
//! |--------|--------|----------|
//! | Safe command | any | Approved |
//! | File-creating command | any | Approved |
//! | File-altering command | user | Approved |
//! | File-altering command | agent | Awaiting confirmation |
//! | History lookup | any | Approved with consent, else denied |
//!
//! Malformed actions are denied before classification. Unclassifiable
//! commands count as file-altering, so `origin` alone never approves them.
//!
//! # Example
//!
//! ```rust
//! use chatty_core::broker::{ConfirmationResponse, Decision, PermissionBroker};
//! use chatty_core::consent::ConsentStore;
//! use chatty_core::{Origin, ProposedAction};
//!
//! let consent = ConsentStore::new();
//! let mut broker = PermissionBroker::new();
//!
//! let decision = broker
//!     .evaluate(ProposedAction::shell("rm -rf build/", Origin::AgentInferred), &consent)
//!     .unwrap();
//! let token = match decision {
//!     Decision::AwaitingConfirmation(request) => request.token.clone(),
//!     other => panic!("expected confirmation, got {:?}", other),
//! };
//!
//! let decision = broker
//!     .resolve_confirmation(&token, ConfirmationResponse::deny(Some("not now".into())))
//!     .unwrap();
//! assert!(decision.is_denied());
//! ```

mod decision;
mod machine;

pub use decision::{
    ApprovedAction, ApprovedCommand, ApprovedLookup, BrokerState, ConfirmationDecision,
    ConfirmationRequest, ConfirmationResponse, Decision, Denial, DenialReason, PendingToken,
};
pub use machine::{PermissionBroker, DEFAULT_CONSENT_GUIDANCE};
