//! Replay of scripted agent proposals
//!
//! A script is a JSON Lines file of proposed actions, one per line:
//!
//! ```text
//! {"kind": "shell_command", "payload": "ls -la"}
//! {"kind": "shell_command", "payload": "rm -rf build/"}
//! {"kind": "history_lookup", "payload": "git"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Every action is
//! replayed as the agent's own proposal, whatever origin the line names.

use std::path::Path;

use chatty_core::{Origin, Outcome, ProposedAction, Session};

use crate::error::CliError;
use crate::repl::{
    new_event_queue, print_outcome, submit_and_settle, ConfirmationPrompter, EventPresenter,
    PresentationHook,
};

/// Tally of a replayed script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    /// Commands that ran, whatever their exit code
    pub executed: usize,
    /// Commands that exited non-zero or could not run
    pub failed: usize,
    pub lookups: usize,
    pub denied: usize,
    /// Actions the session could not handle at all
    pub errors: usize,
}

impl ScriptSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Executed(result) => {
                self.executed += 1;
                if !result.success() {
                    self.failed += 1;
                }
            }
            Outcome::History(_) => self.lookups += 1,
            Outcome::Denied(_) => self.denied += 1,
            Outcome::NeedsConfirmation(_) => {}
        }
    }
}

impl std::fmt::Display for ScriptSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} executed ({} failed), {} lookups, {} denied, {} errors",
            self.executed, self.failed, self.lookups, self.denied, self.errors
        )
    }
}

/// Parse a JSON Lines script into proposed actions
pub fn parse_script(text: &str) -> Result<Vec<ProposedAction>, CliError> {
    let mut actions = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let action: ProposedAction = serde_json::from_str(line).map_err(|source| {
            CliError::Script {
                line: idx + 1,
                source,
            }
        })?;
        if action.origin() != Origin::AgentInferred {
            log::warn!(
                "Script line {} claims origin {}; replaying it as an agent proposal",
                idx + 1,
                action.origin()
            );
        }
        actions.push(ProposedAction::new(
            action.kind(),
            action.payload(),
            Origin::AgentInferred,
        ));
    }
    Ok(actions)
}

/// Replay actions one after another, asking `prompter` for confirmations
pub async fn replay(
    session: &mut Session,
    actions: Vec<ProposedAction>,
    prompter: &dyn ConfirmationPrompter,
) -> Result<ScriptSummary, CliError> {
    let queue = new_event_queue();
    session.add_hook(PresentationHook::new(queue.clone()));
    let presenter = EventPresenter::new(queue);

    let mut summary = ScriptSummary::default();
    for action in actions {
        println!("\n▶ {} `{}`", action.kind(), action.payload());
        match submit_and_settle(session, action, prompter).await {
            Ok(outcome) => {
                print_outcome(&outcome);
                presenter.flush();
                summary.record(&outcome);
            }
            Err(e) => {
                log::warn!("Scripted action failed: {}", e);
                eprintln!("❌ Error: {}", e);
                summary.errors += 1;
            }
        }
    }

    log::info!("Script finished: {}", summary);
    Ok(summary)
}

/// Read a script file and replay it
pub async fn run_script(
    session: &mut Session,
    path: &Path,
    prompter: &dyn ConfirmationPrompter,
) -> Result<ScriptSummary, CliError> {
    let text = tokio::fs::read_to_string(path).await?;
    let actions = parse_script(&text)?;
    log::info!("Replaying {} actions from {}", actions.len(), path.display());
    replay(session, actions, prompter).await
}
