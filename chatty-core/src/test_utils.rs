//! Test utilities for chatty-core.
//!
//! This module provides a scripted shell and an event collector for testing
//! sessions without touching a real shell.
//!
//! Enable with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! chatty-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust
//! use chatty_core::{Origin, Outcome, ProposedAction, Session};
//! use chatty_core::test_utils::{EventCollector, ScriptedShell};
//!
//! # tokio_test::block_on(async {
//! let dir = tempfile::tempdir().unwrap();
//! let shell = ScriptedShell::new(dir.path()).with_stdout("ls", "README.md\n");
//! let events = EventCollector::new();
//!
//! let mut session = Session::builder()
//!     .with_shell(shell)
//!     .add_hook(events.clone())
//!     .build()
//!     .unwrap();
//!
//! let outcome = session
//!     .submit(ProposedAction::shell("ls", Origin::AgentInferred))
//!     .await
//!     .unwrap();
//! assert!(matches!(outcome, Outcome::Executed(_)));
//! assert!(events.has_event("execution_completed"));
//! # });
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::action::ActionId;
use crate::broker::BrokerState;
use crate::events::{PolicyEvent, PolicyHook};
use crate::gateway::{ShellOutput, ShellSession};

type Effect = Arc<dyn Fn(&str, &Path) + Send + Sync>;

/// A shell that returns pre-programmed output.
///
/// Every command is recorded. Commands without scripted output succeed with
/// no output. An optional effect runs for every command, which lets tests
/// create files the way a real command would.
#[derive(Clone)]
pub struct ScriptedShell {
    cwd: PathBuf,
    outputs: HashMap<String, ShellOutput>,
    calls: Arc<Mutex<Vec<String>>>,
    effect: Option<Effect>,
    unavailable: bool,
}

impl ScriptedShell {
    /// Create a shell that reports `cwd` as its working directory.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            outputs: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            effect: None,
            unavailable: false,
        }
    }

    /// Return `output` when exactly `command` runs.
    pub fn with_output(mut self, command: impl Into<String>, output: ShellOutput) -> Self {
        self.outputs.insert(command.into(), output);
        self
    }

    /// Succeed with `stdout` when exactly `command` runs.
    pub fn with_stdout(self, command: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.with_output(
            command,
            ShellOutput {
                exit_code: 0,
                stdout: stdout.into().into_bytes(),
                stderr: Vec::new(),
            },
        )
    }

    /// Exit with `code` when exactly `command` runs.
    pub fn with_exit_code(self, command: impl Into<String>, code: i32) -> Self {
        self.with_output(
            command,
            ShellOutput {
                exit_code: code,
                ..ShellOutput::default()
            },
        )
    }

    /// Run `effect(command, cwd)` for every command.
    pub fn with_effect(mut self, effect: impl Fn(&str, &Path) + Send + Sync + 'static) -> Self {
        self.effect = Some(Arc::new(effect));
        self
    }

    /// Fail every run as if the shell binary were missing.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Shared log of the commands run so far.
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl ShellSession for ScriptedShell {
    async fn run(&mut self, command: &str) -> std::io::Result<ShellOutput> {
        self.calls.lock().push(command.to_string());
        if self.unavailable {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "scripted shell is unavailable",
            ));
        }
        if let Some(effect) = &self.effect {
            effect(command, &self.cwd);
        }
        Ok(self.outputs.get(command).cloned().unwrap_or_default())
    }

    fn working_dir(&self) -> &Path {
        &self.cwd
    }
}

/// Collects policy events for later assertions.
///
/// Clones share the same buffer, so register a clone as the hook and keep
/// the original for inspection.
#[derive(Clone, Default)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<PolicyEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// All collected events.
    pub fn events(&self) -> Vec<PolicyEvent> {
        self.events.lock().clone()
    }

    /// Names of all collected events, in order.
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(PolicyEvent::name).collect()
    }

    pub fn has_event(&self, name: &str) -> bool {
        self.events.lock().iter().any(|e| e.name() == name)
    }

    pub fn count_event(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|e| e.name() == name).count()
    }

    /// States an action passed through, in order.
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

    /// Every `(id, from, to)` transition, in order.
    pub fn transitions(&self) -> Vec<(ActionId, Option<BrokerState>, BrokerState)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                PolicyEvent::StateChanged { id, from, to } => Some((*id, *from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl PolicyHook for EventCollector {
    fn on_event(&self, event: &PolicyEvent) {
        self.events.lock().push(event.clone());
    }
}
