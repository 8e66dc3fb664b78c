//! The broker's per-action state machine.

use std::sync::Arc;

use super::decision::{
    ApprovedAction, ApprovedCommand, ApprovedLookup, BrokerState, ConfirmationDecision,
    ConfirmationRequest, ConfirmationResponse, Decision, Denial, DenialReason, PendingToken,
};
use crate::action::{ActionId, ActionKind, Origin, ProposedAction};
use crate::classifier::{classify, RiskCategory};
use crate::consent::{Capability, ConsentStore};
use crate::error::{PolicyError, Result};
use crate::events::{Hooks, PolicyEvent, PolicyHook};

/// Guidance shown when a history lookup is denied for lack of consent.
pub const DEFAULT_CONSENT_GUIDANCE: &str =
    "History lookup needs your consent. Grant it for this session with `/grant history`.";

/// Decides, for each proposed action, whether it runs, waits for the
/// human, or is refused.
///
/// One action is handled at a time. While a confirmation is outstanding,
/// [`evaluate`](Self::evaluate) rejects new actions with
/// [`PolicyError::ConfirmationPending`]; nothing is queued.
pub struct PermissionBroker {
    next_id: u64,
    pending: Option<ConfirmationRequest>,
    consent_guidance: String,
    hooks: Hooks,
}

impl PermissionBroker {
    /// Create a broker with the default consent guidance.
    pub fn new() -> Self {
        Self::with_hooks(DEFAULT_CONSENT_GUIDANCE, Hooks::default())
    }

    pub(crate) fn with_hooks(consent_guidance: impl Into<String>, hooks: Hooks) -> Self {
        Self {
            next_id: 0,
            pending: None,
            consent_guidance: consent_guidance.into(),
            hooks,
        }
    }

    /// Set the text explaining how to grant history-lookup consent.
    pub fn with_consent_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.consent_guidance = guidance.into();
        self
    }

    /// Register an observer for broker events.
    pub fn add_hook(&self, hook: impl PolicyHook + 'static) {
        self.hooks.add(Arc::new(hook));
    }

    /// The outstanding confirmation, if any.
    pub fn pending(&self) -> Option<&ConfirmationRequest> {
        self.pending.as_ref()
    }

    /// Classify an action and decide what happens to it.
    ///
    /// Classification always precedes the origin check. Consent is read from
    /// `consent` at decision time.
    pub fn evaluate(
        &mut self,
        action: ProposedAction,
        consent: &ConsentStore,
    ) -> Result<Decision> {
        if let Some(pending) = &self.pending {
            return Err(PolicyError::ConfirmationPending {
                pending: pending.action_id,
            });
        }

        self.next_id += 1;
        let id = ActionId(self.next_id);
        log::debug!("Received {} {}: {:?}", action.kind(), id, action.payload());
        self.hooks.emit(PolicyEvent::ActionReceived {
            id,
            action: action.clone(),
        });
        self.transition(id, None, BrokerState::Received);

        if let Err(message) = action.validate() {
            return Ok(self.deny(
                id,
                BrokerState::Received,
                Denial::new(DenialReason::InvalidAction, message),
            ));
        }

        match action.kind() {
            ActionKind::HistoryLookup => {
                self.transition(id, Some(BrokerState::Received), BrokerState::Classified);
                if consent.has_consent(Capability::HistoryLookup) {
                    Ok(self.approve(
                        id,
                        BrokerState::Classified,
                        ApprovedAction::HistoryLookup(ApprovedLookup::new(id, action)),
                    ))
                } else {
                    let denial =
                        Denial::new(DenialReason::ConsentMissing, self.consent_guidance.clone());
                    Ok(self.deny(id, BrokerState::Classified, denial))
                }
            }
            ActionKind::ShellCommand => {
                let risk = classify(action.payload());
                log::debug!("Classified {} as {}", id, risk);
                self.hooks.emit(PolicyEvent::ActionClassified { id, risk });
                self.transition(id, Some(BrokerState::Received), BrokerState::Classified);

                if risk == RiskCategory::FileAltering && action.origin() == Origin::AgentInferred {
                    let request = ConfirmationRequest {
                        token: PendingToken::generate(),
                        action_id: id,
                        action,
                        reason: risk,
                    };
                    self.transition(
                        id,
                        Some(BrokerState::Classified),
                        BrokerState::AwaitingConfirmation,
                    );
                    self.hooks.emit(PolicyEvent::ConfirmationRequested {
                        request: request.clone(),
                    });
                    self.pending = Some(request.clone());
                    Ok(Decision::AwaitingConfirmation(request))
                } else {
                    let approved = ApprovedCommand::new(id, action, risk, false);
                    Ok(self.approve(
                        id,
                        BrokerState::Classified,
                        ApprovedAction::Command(approved),
                    ))
                }
            }
        }
    }

    /// Apply the human's answer to the outstanding confirmation.
    ///
    /// Approve yields [`Decision::Approved`]; deny yields a
    /// [`DenialReason::ConfirmationDenied`] denial carrying the note. A token
    /// that does not match the outstanding request is an error and leaves the
    /// request pending.
    pub fn resolve_confirmation(
        &mut self,
        token: &PendingToken,
        response: ConfirmationResponse,
    ) -> Result<Decision> {
        let request = match self.pending.take() {
            Some(request) if &request.token == token => request,
            other => {
                self.pending = other;
                return Err(PolicyError::UnknownConfirmation(token.clone()));
            }
        };

        let id = request.action_id;
        match response.decision {
            ConfirmationDecision::Approve => {
                log::info!("Confirmation approved for {}", id);
                let approved = ApprovedCommand::new(id, request.action, request.reason, true);
                Ok(self.approve(
                    id,
                    BrokerState::AwaitingConfirmation,
                    ApprovedAction::Command(approved),
                ))
            }
            ConfirmationDecision::Deny => {
                let denial = refusal(&request, response.note.as_deref());
                Ok(self.deny(id, BrokerState::AwaitingConfirmation, denial))
            }
        }
    }

    /// Resolve the outstanding confirmation as denied.
    pub fn cancel_pending(&mut self, note: Option<String>) -> Result<Denial> {
        let token = self
            .pending
            .as_ref()
            .map(|request| request.token.clone())
            .ok_or(PolicyError::NothingPending)?;

        match self.resolve_confirmation(&token, ConfirmationResponse::deny(note))? {
            Decision::Denied(denial) => Ok(denial),
            // Deny always resolves to a denial
            _ => Err(PolicyError::NothingPending),
        }
    }

    fn approve(&self, id: ActionId, from: BrokerState, approved: ApprovedAction) -> Decision {
        self.transition(id, Some(from), BrokerState::Approved);
        Decision::Approved(approved)
    }

    fn deny(&self, id: ActionId, from: BrokerState, denial: Denial) -> Decision {
        log::warn!("Denied {}: {}", id, denial);
        self.transition(id, Some(from), BrokerState::Denied);
        self.hooks.emit(PolicyEvent::ActionDenied {
            id,
            denial: denial.clone(),
        });
        Decision::Denied(denial)
    }

    fn transition(&self, id: ActionId, from: Option<BrokerState>, to: BrokerState) {
        log::debug!("{}: {:?} -> {}", id, from, to);
        self.hooks.emit(PolicyEvent::StateChanged { id, from, to });
    }
}

impl Default for PermissionBroker {
    fn default() -> Self {
        Self::new()
    }
}

fn refusal(request: &ConfirmationRequest, note: Option<&str>) -> Denial {
    let mut message = format!("You declined to run `{}`.", request.command());
    if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
        message.push_str(" Note: ");
        message.push_str(note);
    }
    Denial::new(DenialReason::ConfirmationDenied, message)
}
