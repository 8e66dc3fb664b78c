//! The session: one conversation, one live shell, one consent store.
//!
//! [`Session`] is the entry point for collaborators. It owns the broker,
//! the gateway and the history adapter and routes each decision to the
//! right one.
//!
//! ```rust
//! use chatty_core::{Origin, Outcome, ProposedAction, Session};
//!
//! # tokio_test::block_on(async {
//! let dir = tempfile::tempdir().unwrap();
//! let mut session = Session::builder()
//!     .with_working_dir(dir.path())
//!     .build()
//!     .unwrap();
//!
//! let outcome = session
//!     .submit(ProposedAction::shell("rm -rf build/", Origin::AgentInferred))
//!     .await
//!     .unwrap();
//! assert!(matches!(outcome, Outcome::NeedsConfirmation(_)));
//! # });
//! ```

mod builder;

use std::path::Path;
use std::sync::Arc;

use crate::action::ProposedAction;
use crate::broker::{
    ApprovedAction, ConfirmationRequest, ConfirmationResponse, Decision, Denial,
    PendingToken, PermissionBroker,
};
use crate::config::SessionConfig;
use crate::consent::{Capability, ConsentGrant, ConsentStore};
use crate::error::Result;
use crate::events::{Hooks, PolicyEvent, PolicyHook};
use crate::gateway::{ExecutionGateway, ExecutionResult};
use crate::history::{HistoryEntry, HistoryQueryAdapter, SessionHistory};

pub use builder::SessionBuilder;

/// What the collaborator gets back for a submitted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The command ran; inspect the exit code.
    Executed(ExecutionResult),
    /// Matching history entries, oldest first.
    History(Vec<HistoryEntry>),
    /// The human must answer before anything runs.
    NeedsConfirmation(ConfirmationRequest),
    /// The action was refused.
    Denied(Denial),
}

/// One running assistant instance.
///
/// Mutating methods take `&mut self`, so actions are handled strictly one
/// after another.
pub struct Session {
    config: SessionConfig,
    consent: Arc<ConsentStore>,
    broker: PermissionBroker,
    gateway: ExecutionGateway,
    history: HistoryQueryAdapter,
    hooks: Hooks,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Submit a proposed action.
    ///
    /// Fails only with a protocol error, such as
    /// [`PolicyError::ConfirmationPending`](crate::PolicyError::ConfirmationPending),
    /// or when a history source cannot be read.
    pub async fn submit(&mut self, action: ProposedAction) -> Result<Outcome> {
        let decision = self.broker.evaluate(action, &self.consent)?;
        self.follow(decision).await
    }

    /// Answer the outstanding confirmation.
    pub async fn resolve(
        &mut self,
        token: &PendingToken,
        response: ConfirmationResponse,
    ) -> Result<Outcome> {
        let decision = self.broker.resolve_confirmation(token, response)?;
        self.follow(decision).await
    }

    /// Deny the outstanding confirmation, e.g. on Ctrl-C.
    pub fn cancel_pending(&mut self, note: Option<String>) -> Result<Denial> {
        self.broker.cancel_pending(note)
    }

    pub fn pending(&self) -> Option<&ConfirmationRequest> {
        self.broker.pending()
    }

    /// Grant standing consent for the rest of the session.
    pub fn grant(&self, capability: Capability) -> ConsentGrant {
        let is_new = !self.consent.has_consent(capability);
        let grant = self.consent.grant(capability);
        if is_new {
            self.hooks.emit(PolicyEvent::ConsentGranted {
                grant: grant.clone(),
            });
        }
        grant
    }

    /// The session's consent store, shareable for read-only display.
    pub fn consent(&self) -> &Arc<ConsentStore> {
        &self.consent
    }

    pub fn add_hook(&self, hook: impl PolicyHook + 'static) {
        self.hooks.add(Arc::new(hook));
    }

    pub fn working_dir(&self) -> &Path {
        self.gateway.working_dir()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Commands executed through this session so far.
    pub fn session_history(&self) -> &Arc<SessionHistory> {
        self.gateway.history()
    }

    async fn follow(&mut self, decision: Decision) -> Result<Outcome> {
        match decision {
            Decision::Approved(ApprovedAction::Command(command)) => {
                Ok(Outcome::Executed(self.gateway.execute(command).await))
            }
            Decision::Approved(ApprovedAction::HistoryLookup(lookup)) => {
                let entries = self.history.lookup(&lookup)?;
                self.hooks.emit(PolicyEvent::HistoryQueried {
                    id: lookup.id(),
                    query: lookup.query().to_string(),
                    matches: entries.len(),
                });
                Ok(Outcome::History(entries))
            }
            Decision::AwaitingConfirmation(request) => Ok(Outcome::NeedsConfirmation(request)),
            Decision::Denied(denial) => Ok(Outcome::Denied(denial)),
        }
    }
}
