//! # chatty-core
//!
//! A tool-use policy engine that sits between a conversational agent and a
//! live shell session.
//!
//! For every action the agent wants to take, the engine decides whether it
//! may run unattended, must first be confirmed by the human, or is gated
//! behind one-time consent. Destructive commands never run without either
//! an explicit instruction from the human or an explicit confirmation.
//!
//! ## Quick Start
//!
//! ```no_run
//! use chatty_core::{ConfirmationResponse, Origin, Outcome, ProposedAction, Session};
//!
//! # async fn example() -> chatty_core::Result<()> {
//! let mut session = Session::builder().with_shell_program("bash").build()?;
//!
//! let outcome = session
//!     .submit(ProposedAction::shell("rm -rf build/", Origin::AgentInferred))
//!     .await?;
//!
//! if let Outcome::NeedsConfirmation(request) = outcome {
//!     println!("Run `{}`? ({})", request.command(), request.reason);
//!     let outcome = session
//!         .resolve(&request.token, ConfirmationResponse::approve())
//!         .await?;
//!     if let Outcome::Executed(result) = outcome {
//!         println!("exit code {}", result.exit_code);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Components
//!
//! - **[`classify`]**: Pure risk classification of a command string
//! - **[`ConsentStore`]**: Session-scoped standing consent (history lookup)
//! - **[`PermissionBroker`]**: The per-action state machine and decision table
//! - **[`ExecutionGateway`]**: Runs approved commands and names created files
//! - **[`HistoryQueryAdapter`]**: Consent-gated search of command history
//! - **[`Session`]**: Owns all of the above for one conversation
//!
//! ## Observing the Engine
//!
//! Every state transition, decision, execution and consent grant is emitted
//! as a [`PolicyEvent`]. Register a [`PolicyHook`] (or a closure) on the
//! builder or the session to receive them.

pub mod action;
pub mod broker;
pub mod classifier;
pub mod config;
pub mod consent;
pub mod error;
pub mod events;
pub mod gateway;
pub mod history;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use action::{ActionId, ActionKind, Origin, ProposedAction};
pub use broker::{
    ApprovedAction, ApprovedCommand, ApprovedLookup, BrokerState, ConfirmationDecision,
    ConfirmationRequest, ConfirmationResponse, Decision, Denial, DenialReason, PendingToken,
    PermissionBroker,
};
pub use classifier::{classify, RiskCategory};
pub use config::SessionConfig;
pub use consent::{Capability, ConsentGrant, ConsentStore};
pub use error::{PolicyError, Result};
pub use events::{PolicyEvent, PolicyHook};
pub use gateway::{
    ExecutionGateway, ExecutionResult, ShellOutput, ShellSession, SnapshotLimits, SystemShell,
};
pub use history::{
    HistoryEntry, HistoryQueryAdapter, HistorySource, SessionHistory, ShellHistoryFile,
};
pub use session::{Outcome, Session, SessionBuilder};
