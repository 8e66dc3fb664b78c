//! Core REPL utilities

use chatty_core::{Capability, Session};
use std::io::Write;

/// ANSI escape code to reset terminal styling
pub const RESET_STYLE: &str = "\x1b[0m";

/// The input prompt string
pub fn input_prompt() -> &'static str {
    "  ❯ "
}

/// Format the welcome banner header
pub fn format_welcome_header() -> String {
    format!("🛡️  chatty v{}", env!("CARGO_PKG_VERSION"))
}

/// Format the shell line of the banner
pub fn format_shell_info(shell: &str, cwd: &str) -> String {
    format!("Shell: {} in {}", shell, cwd)
}

/// Flush stdout before reading input
pub fn print_input_padding() {
    let _ = std::io::stdout().flush();
}

/// Reset terminal styling after input
pub fn reset_input_style() {
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "{}", RESET_STYLE);
    let _ = stdout.flush();
}

/// Format the tip line shown at startup
pub fn format_tip() -> &'static str {
    "Type a command to propose it for the agent, !cmd to run it yourself, /help for more"
}

/// Print welcome message and session info
pub fn print_welcome(session: &Session) {
    println!("\n{}", format_welcome_header());
    println!(
        "{}",
        format_shell_info(
            &session.config().shell,
            &session.working_dir().display().to_string()
        )
    );
    if !session.consent().has_consent(Capability::HistoryLookup) {
        println!("History lookup: not granted (use /grant history)");
    }
    println!("{}", format_tip());
    println!();
}
