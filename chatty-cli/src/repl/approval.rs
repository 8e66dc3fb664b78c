//! Confirmation prompts for file-altering commands
//!
//! The engine hands over a [`ConfirmationRequest`]; the prompter asks the
//! human and answers with a binary approve/deny plus an optional note.

use chatty_core::{ConfirmationRequest, ConfirmationResponse};
use rustyline::DefaultEditor;

// =============================================================================
// Core Types
// =============================================================================

/// Trait for confirmation prompt implementations
///
/// Implement this to create custom confirmation UX.
pub trait ConfirmationPrompter: Send + Sync {
    /// Prompt the human and return their answer
    ///
    /// `None` means the prompt was abandoned (Ctrl-C or end of input) and
    /// the request should be cancelled.
    fn prompt(&self, request: &ConfirmationRequest) -> Option<ConfirmationResponse>;

    /// Human-readable name for this prompter
    fn name(&self) -> &'static str;
}

/// A parsed answer to the confirmation question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Approve,
    Deny,
}

impl Choice {
    /// Parse a typed answer; `None` for anything unrecognized
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => Some(Self::Approve),
            "n" | "no" | "deny" => Some(Self::Deny),
            _ => None,
        }
    }
}

// =============================================================================
// Default Prompter Implementation
// =============================================================================

/// Simple y/n prompter reading from stdin
///
/// Displays:
/// - y: run the command
/// - n: refuse, optionally with a note for the agent
pub struct SimplePrompter;

impl ConfirmationPrompter for SimplePrompter {
    fn name(&self) -> &'static str {
        "SimplePrompter"
    }

    fn prompt(&self, request: &ConfirmationRequest) -> Option<ConfirmationResponse> {
        print_request_header(request);

        println!("\n\x1b[33mConfirmation required:\x1b[0m");
        println!("  \x1b[1my\x1b[0m  run it");
        println!("  \x1b[1mn\x1b[0m  don't run it");

        loop {
            let input = read_input("\nChoice: ")?;
            if input.trim().is_empty() {
                continue;
            }

            match Choice::parse(&input) {
                Some(Choice::Approve) => {
                    print_confirmation("Approved");
                    return Some(ConfirmationResponse::approve());
                }
                Some(Choice::Deny) => {
                    let note = read_input("Note for the agent (optional): ")
                        .map(|n| n.trim().to_string());
                    print_confirmation("Denied");
                    return Some(ConfirmationResponse::deny(note.filter(|n| !n.is_empty())));
                }
                None => {
                    println!("\x1b[31mInvalid choice. Use y/n\x1b[0m");
                }
            }
        }
    }
}

/// Default prompter type
pub type DefaultPrompter = SimplePrompter;

// =============================================================================
// Helper Functions
// =============================================================================

/// Format the request header: the command and why it needs an answer
pub fn format_request_header(request: &ConfirmationRequest) -> String {
    format!(
        "\n⚠️  \x1b[1m{}\x1b[0m\n  {} proposed a {} command",
        request.command(),
        request.action.origin(),
        request.reason
    )
}

/// Print the request header
pub fn print_request_header(request: &ConfirmationRequest) {
    println!("{}", format_request_header(request));
}

/// Read a line of input; `None` on Ctrl-C or end of input
pub fn read_input(prompt: &str) -> Option<String> {
    let mut editor = DefaultEditor::new().ok()?;
    editor.readline(prompt).ok()
}

/// Print a confirmation message
pub fn print_confirmation(message: &str) {
    println!("  \x1b[32m✓\x1b[0m {}", message);
}

/// Convenience function using the default prompter
pub fn prompt_for_confirmation(request: &ConfirmationRequest) -> Option<ConfirmationResponse> {
    SimplePrompter.prompt(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_approve() {
        assert_eq!(Choice::parse("y"), Some(Choice::Approve));
        assert_eq!(Choice::parse("YES\n"), Some(Choice::Approve));
    }

    #[test]
    fn parses_deny() {
        assert_eq!(Choice::parse("n"), Some(Choice::Deny));
        assert_eq!(Choice::parse(" no "), Some(Choice::Deny));
        assert_eq!(Choice::parse("deny"), Some(Choice::Deny));
    }

    #[test]
    fn rejects_other_input() {
        assert_eq!(Choice::parse(""), None);
        assert_eq!(Choice::parse("maybe"), None);
        assert_eq!(Choice::parse("t"), None);
    }

    #[test]
    fn header_shows_command_and_reason() {
        use chatty_core::{ActionId, Origin, ProposedAction, RiskCategory};

        let request = ConfirmationRequest {
            token: "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap(),
            action_id: ActionId(4),
            action: ProposedAction::shell("rm -rf build/", Origin::AgentInferred),
            reason: RiskCategory::FileAltering,
        };
        let header = format_request_header(&request);
        assert!(header.contains("rm -rf build/"));
        assert!(header.contains("agent proposed a file-altering command"));
    }

    #[test]
    fn simple_prompter_name() {
        assert_eq!(SimplePrompter.name(), "SimplePrompter");
    }
}
