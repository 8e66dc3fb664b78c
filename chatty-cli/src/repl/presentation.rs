//! Presentation of outcomes and notices for CLI output

use chatty_core::{
    ConsentGrant, Denial, ExecutionResult, HistoryEntry, Outcome, PolicyEvent, PolicyHook,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Queue for events that need to be printed
pub type EventQueue = Arc<Mutex<VecDeque<PolicyEvent>>>;

/// Create a new event queue
pub fn new_event_queue() -> EventQueue {
    Arc::new(Mutex::new(VecDeque::new()))
}

/// Hook that queues notices for later presentation
///
/// Events are queued rather than printed immediately so that a command's
/// own output appears before the notices about it.
pub struct PresentationHook {
    queue: EventQueue,
}

impl PresentationHook {
    pub fn new(queue: EventQueue) -> Self {
        Self { queue }
    }
}

impl PolicyHook for PresentationHook {
    fn on_event(&self, event: &PolicyEvent) {
        match event {
            PolicyEvent::FilesCreated { .. } | PolicyEvent::ConsentGranted { .. } => {
                self.queue.lock().push_back(event.clone());
            }
            _ => {}
        }
    }
}

/// Presenter that formats and prints queued events
pub struct EventPresenter {
    queue: EventQueue,
}

impl EventPresenter {
    pub fn new(queue: EventQueue) -> Self {
        Self { queue }
    }

    /// Drain and print all queued events
    pub fn flush(&self) {
        let mut queue = self.queue.lock();
        while let Some(event) = queue.pop_front() {
            if let Some(text) = format_notice(&event) {
                println!("{}", text);
            }
        }
    }
}

/// Format a queued event as a notice line
pub fn format_notice(event: &PolicyEvent) -> Option<String> {
    match event {
        PolicyEvent::FilesCreated { paths, .. } => Some(format_created_notice(paths)),
        PolicyEvent::ConsentGranted { grant } => Some(format_grant(grant)),
        _ => None,
    }
}

/// The creation notice, shown for every file-creating command that made something
pub fn format_created_notice(paths: &[String]) -> String {
    format!("\x1b[36m📄 Created:\x1b[0m {}", paths.join(", "))
}

pub fn format_grant(grant: &ConsentGrant) -> String {
    format!(
        "  \x1b[32m✓\x1b[0m {} granted for this session ({})",
        grant.capability,
        grant.granted_at.format("%H:%M:%S")
    )
}

pub fn format_denial(denial: &Denial) -> String {
    format!("\x1b[31m✗ Denied ({})\x1b[0m {}", denial.reason, denial.message)
}

/// Format a command's output and exit status
pub fn format_result(result: &ExecutionResult) -> String {
    let mut output = String::new();

    let stdout = result.stdout_lossy();
    if !stdout.is_empty() {
        output.push_str(&stdout);
        if !stdout.ends_with('\n') {
            output.push('\n');
        }
    }

    let stderr = result.stderr_lossy();
    if !stderr.is_empty() && result.fault.is_none() {
        output.push_str(&dim_text(stderr.trim_end()));
        output.push('\n');
    }

    if let Some(fault) = &result.fault {
        output.push_str(&format!("\x1b[31m❌ {}\x1b[0m\n", fault));
    } else if result.exit_code != 0 {
        output.push_str(&format!(
            "\x1b[31m❌ Command exited with status: {}\x1b[0m\n",
            result.exit_code
        ));
    }

    output
}

/// Format history matches, oldest first
pub fn format_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "\nNo matching history entries.\n".to_string();
    }

    let mut output = format!("\n📜 History matches ({}):\n\n", entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        match entry.timestamp {
            Some(at) => output.push_str(&format!(
                "  {:>3}. {}  \x1b[2m{}\x1b[0m\n",
                idx + 1,
                entry.command,
                at.format("%Y-%m-%d %H:%M")
            )),
            None => output.push_str(&format!("  {:>3}. {}\n", idx + 1, entry.command)),
        }
    }
    output
}

/// Format the list of standing grants
pub fn format_grants(grants: &[ConsentGrant]) -> String {
    let mut output = String::from("\n🔐 Consent:\n\n");
    if grants.is_empty() {
        output.push_str("  Nothing granted yet. Use /grant history to allow history lookups.\n");
    } else {
        for grant in grants {
            output.push_str(&format!(
                "  {} (since {})\n",
                grant.capability,
                grant.granted_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
    }
    output
}

/// Print a settled outcome
pub fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Executed(result) => print!("{}", format_result(result)),
        Outcome::History(entries) => print!("{}", format_history(entries)),
        Outcome::Denied(denial) => println!("{}", format_denial(denial)),
        Outcome::NeedsConfirmation(request) => {
            println!("Awaiting confirmation for `{}`", request.command())
        }
    }
}

fn dim_text(text: &str) -> String {
    format!("\x1b[2m{}\x1b[0m", text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatty_core::{ActionId, Capability};
    use std::time::Duration;

    fn result(exit_code: i32, stdout: &str, stderr: &str) -> ExecutionResult {
        ExecutionResult {
            exit_code,
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
            created_paths: Vec::new(),
            fault: None,
            duration: Duration::from_millis(3),
        }
    }

    #[test]
    fn hook_queues_only_notices() {
        let queue = new_event_queue();
        let hook = PresentationHook::new(queue.clone());

        hook.on_event(&PolicyEvent::FilesCreated {
            id: ActionId(1),
            paths: vec!["notes.txt".to_string()],
        });
        hook.on_event(&PolicyEvent::ExecutionCompleted {
            id: ActionId(1),
            exit_code: 0,
            fault: None,
            duration: Duration::from_millis(1),
        });
        hook.on_event(&PolicyEvent::ConsentGranted {
            grant: ConsentGrant::new(Capability::HistoryLookup),
        });

        assert_eq!(queue.lock().len(), 2);
    }

    #[test]
    fn presenter_drains_queue() {
        let queue = new_event_queue();
        queue.lock().push_back(PolicyEvent::FilesCreated {
            id: ActionId(1),
            paths: vec!["a".to_string()],
        });
        EventPresenter::new(queue.clone()).flush();
        assert!(queue.lock().is_empty());
    }

    #[test]
    fn created_notice_names_every_path() {
        let notice = format_created_notice(&["notes.txt".to_string(), "out/".to_string()]);
        assert!(notice.contains("Created:"));
        assert!(notice.contains("notes.txt, out/"));
    }

    #[test]
    fn notice_for_other_events_is_none() {
        let event = PolicyEvent::ExecutionCompleted {
            id: ActionId(2),
            exit_code: 1,
            fault: None,
            duration: Duration::from_millis(1),
        };
        assert!(format_notice(&event).is_none());
    }

    #[test]
    fn result_shows_stdout_and_exit_status() {
        let output = format_result(&result(2, "partial", "boom\n"));
        assert!(output.starts_with("partial\n"));
        assert!(output.contains("boom"));
        assert!(output.contains("status: 2"));
    }

    #[test]
    fn successful_result_has_no_status_line() {
        let output = format_result(&result(0, "ok\n", ""));
        assert_eq!(output, "ok\n");
    }

    #[test]
    fn fault_replaces_status_line() {
        let mut faulted = result(127, "", "failed to run shell: not found");
        faulted.fault = Some("failed to run shell: not found".to_string());
        let output = format_result(&faulted);
        assert!(output.contains("failed to run shell"));
        assert!(!output.contains("status: 127"));
    }

    #[test]
    fn history_is_numbered_in_order() {
        let entries = vec![
            HistoryEntry::new("git status", None),
            HistoryEntry::new("git push", None),
        ];
        let output = format_history(&entries);
        let status = output.find("1. git status").unwrap();
        let push = output.find("2. git push").unwrap();
        assert!(status < push);
    }

    #[test]
    fn empty_history_message() {
        assert!(format_history(&[]).contains("No matching history entries"));
    }

    #[test]
    fn grants_listing() {
        assert!(format_grants(&[]).contains("Nothing granted yet"));
        let grant = ConsentGrant::new(Capability::HistoryLookup);
        assert!(format_grants(&[grant]).contains("history lookup"));
    }
}
