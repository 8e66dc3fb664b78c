use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::action::{ActionId, ProposedAction};
use crate::broker::{BrokerState, ConfirmationRequest, Denial};
use crate::classifier::RiskCategory;
use crate::consent::ConsentGrant;

/// Events emitted while the engine handles actions
///
/// Together they form the session's audit trail: every broker state
/// transition, decision, execution and consent grant is reported.
#[derive(Debug, Clone)]
pub enum PolicyEvent {
    // ===== Broker =====
    /// An action was submitted and assigned an id
    ActionReceived {
        /// Session-local id
        id: ActionId,
        /// The action as proposed
        action: ProposedAction,
    },

    /// A shell command was classified
    ActionClassified {
        /// Action id
        id: ActionId,
        /// Risk the classifier assigned
        risk: RiskCategory,
    },

    /// The broker moved an action to a new state
    StateChanged {
        /// Action id
        id: ActionId,
        /// Previous state, `None` on receipt
        from: Option<BrokerState>,
        /// New state
        to: BrokerState,
    },

    /// A file-altering action needs the human's answer
    ConfirmationRequested {
        /// The request shown to the human
        request: ConfirmationRequest,
    },

    /// An action was refused
    ActionDenied {
        /// Action id
        id: ActionId,
        /// Why
        denial: Denial,
    },

    // ===== Execution =====
    /// The gateway started running a command
    ExecutionStarted {
        /// Action id
        id: ActionId,
        /// Command text
        command: String,
        /// Timestamp
        timestamp: Instant,
    },

    /// The command finished (any exit code)
    ExecutionCompleted {
        /// Action id
        id: ActionId,
        /// Exit code
        exit_code: i32,
        /// Set when the shell could not be run at all
        fault: Option<String>,
        /// Wall-clock duration
        duration: Duration,
    },

    /// A file-creating command produced new paths
    ///
    /// Always emitted when the path list is non-empty, even if the command
    /// printed nothing.
    FilesCreated {
        /// Action id
        id: ActionId,
        /// Created paths, as written or relative to the working directory
        paths: Vec<String>,
    },

    // ===== History & consent =====
    /// A history lookup ran
    HistoryQueried {
        /// Action id
        id: ActionId,
        /// Search text
        query: String,
        /// Number of entries returned
        matches: usize,
    },

    /// The human granted standing consent
    ConsentGranted {
        /// The recorded grant
        grant: ConsentGrant,
    },
}

impl PolicyEvent {
    /// Short snake_case name of the event variant.
    pub fn name(&self) -> &'static str {
        match self {
            PolicyEvent::ActionReceived { .. } => "action_received",
            PolicyEvent::ActionClassified { .. } => "action_classified",
            PolicyEvent::StateChanged { .. } => "state_changed",
            PolicyEvent::ConfirmationRequested { .. } => "confirmation_requested",
            PolicyEvent::ActionDenied { .. } => "action_denied",
            PolicyEvent::ExecutionStarted { .. } => "execution_started",
            PolicyEvent::ExecutionCompleted { .. } => "execution_completed",
            PolicyEvent::FilesCreated { .. } => "files_created",
            PolicyEvent::HistoryQueried { .. } => "history_queried",
            PolicyEvent::ConsentGranted { .. } => "consent_granted",
        }
    }
}

/// Hook for observing policy events
///
/// # Example
/// ```rust
/// use chatty_core::{PolicyEvent, PolicyHook};
///
/// struct AuditLog;
///
/// impl PolicyHook for AuditLog {
///     fn on_event(&self, event: &PolicyEvent) {
///         if let PolicyEvent::StateChanged { id, to, .. } = event {
///             println!("{} -> {}", id, to);
///         }
///     }
/// }
/// ```
pub trait PolicyHook: Send + Sync {
    /// Called when an event occurs
    fn on_event(&self, event: &PolicyEvent);
}

/// Blanket implementation for closures
impl<F> PolicyHook for F
where
    F: Fn(&PolicyEvent) + Send + Sync,
{
    fn on_event(&self, event: &PolicyEvent) {
        self(event)
    }
}

/// Registered hooks, shared by the session and its components.
#[derive(Clone, Default)]
pub(crate) struct Hooks {
    inner: Arc<RwLock<Vec<Arc<dyn PolicyHook>>>>,
}

impl Hooks {
    pub(crate) fn add(&self, hook: Arc<dyn PolicyHook>) {
        self.inner.write().push(hook);
    }

    pub(crate) fn emit(&self, event: PolicyEvent) {
        let hooks = self.inner.read();
        for hook in hooks.iter() {
            hook.on_event(&event);
        }
    }
}
