//! Common test utilities shared across test files.
//!
//! Items here may not be used by all test files, hence the module-level allow.
#![allow(dead_code)]

use async_trait::async_trait;
use chatty_core::{
    ActionId, BrokerState, ConfirmationRequest, Denial, ExecutionResult, HistoryEntry, Outcome,
    PolicyEvent, PolicyHook, Session, ShellOutput, ShellSession,
};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ===== Event Log =====

/// Hook that keeps every event it sees.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<PolicyEvent>>>,
}

impl EventLog {
    pub fn events(&self) -> Vec<PolicyEvent> {
        self.events.lock().clone()
    }

    pub fn states_for(&self, id: ActionId) -> Vec<BrokerState> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                PolicyEvent::StateChanged { id: event_id, to, .. } if *event_id == id => Some(*to),
                _ => None,
            })
            .collect()
    }

    /// Ids of every action the broker received.
    pub fn action_ids(&self) -> Vec<ActionId> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                PolicyEvent::ActionReceived { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn created_notices(&self) -> Vec<Vec<String>> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                PolicyEvent::FilesCreated { paths, .. } => Some(paths.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|e| e.name() == name).count()
    }
}

impl PolicyHook for EventLog {
    fn on_event(&self, event: &PolicyEvent) {
        self.events.lock().push(event.clone());
    }
}

// ===== Recording Shell =====

/// Shell that records commands and never runs anything.
#[derive(Clone)]
pub struct RecordingShell {
    cwd: PathBuf,
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingShell {
    pub fn new(cwd: &Path) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ShellSession for RecordingShell {
    async fn run(&mut self, command: &str) -> std::io::Result<ShellOutput> {
        self.calls.lock().push(command.to_string());
        Ok(ShellOutput::default())
    }

    fn working_dir(&self) -> &Path {
        &self.cwd
    }
}

// ===== Session Helpers =====

/// Session running a real `sh` in `dir`, with an event log attached.
pub fn sh_session(dir: &Path) -> (Session, EventLog) {
    let log = EventLog::default();
    let session = Session::builder()
        .with_shell_program("sh")
        .with_working_dir(dir)
        .add_hook(log.clone())
        .build()
        .expect("session should build");
    (session, log)
}

/// Session that only records commands.
pub fn recording_session(dir: &Path) -> (Session, RecordingShell, EventLog) {
    let shell = RecordingShell::new(dir);
    let log = EventLog::default();
    let session = Session::builder()
        .with_shell(shell.clone())
        .add_hook(log.clone())
        .build()
        .expect("session should build");
    (session, shell, log)
}

// ===== Outcome Helpers =====

pub fn expect_executed(outcome: Outcome) -> ExecutionResult {
    match outcome {
        Outcome::Executed(result) => result,
        other => panic!("expected execution, got {:?}", other),
    }
}

pub fn expect_confirmation(outcome: Outcome) -> ConfirmationRequest {
    match outcome {
        Outcome::NeedsConfirmation(request) => request,
        other => panic!("expected confirmation request, got {:?}", other),
    }
}

pub fn expect_denied(outcome: Outcome) -> Denial {
    match outcome {
        Outcome::Denied(denial) => denial,
        other => panic!("expected denial, got {:?}", other),
    }
}

pub fn expect_history(outcome: Outcome) -> Vec<HistoryEntry> {
    match outcome {
        Outcome::History(entries) => entries,
        other => panic!("expected history, got {:?}", other),
    }
}
