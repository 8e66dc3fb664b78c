use chatty_core::{Capability, Origin, ProposedAction};

/// Classify an input line as a special command type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandType<'a> {
    /// Shell command starting with !
    Shell(&'a str),
    /// Slash command with name and the rest of the line
    Slash { command: &'a str, rest: &'a str },
    /// Plain text, proposed on the agent's behalf
    Regular(&'a str),
}

impl<'a> CommandType<'a> {
    /// Parse an input line into a command type
    pub fn parse(input: &'a str) -> Self {
        if let Some(shell_cmd) = input.strip_prefix('!') {
            return Self::Shell(shell_cmd.trim());
        }

        if input.starts_with('/') {
            let (command, rest) = input
                .split_once(char::is_whitespace)
                .unwrap_or((input, ""));
            return Self::Slash {
                command,
                rest: rest.trim(),
            };
        }

        Self::Regular(input)
    }
}

/// What the REPL should do with one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Hand an action to the session
    Submit(ProposedAction),
    /// Grant standing consent
    Grant(Capability),
    /// List standing grants
    ShowConsent,
    Help,
    Exit,
    /// Print a usage hint
    Usage(&'static str),
    /// Unrecognized slash command
    Unknown(String),
}

impl Request {
    /// Turn a line of input into a request
    ///
    /// `!cmd` is the human's own instruction. `/propose cmd` and plain text
    /// are proposals on the agent's behalf.
    pub fn from_input(input: &str) -> Self {
        match CommandType::parse(input) {
            CommandType::Shell(cmd) => {
                Self::Submit(ProposedAction::shell(cmd, Origin::UserExplicit))
            }
            CommandType::Regular(text) => {
                Self::Submit(ProposedAction::shell(text, Origin::AgentInferred))
            }
            CommandType::Slash { command, rest } => match command {
                "/exit" | "/quit" => Self::Exit,
                "/help" => Self::Help,
                "/consent" => Self::ShowConsent,
                "/propose" if rest.is_empty() => Self::Usage("Usage: /propose <command>"),
                "/propose" => Self::Submit(ProposedAction::shell(rest, Origin::AgentInferred)),
                "/history" if rest.is_empty() => Self::Usage("Usage: /history <query>"),
                "/history" => Self::Submit(ProposedAction::history_lookup(rest)),
                "/grant" => match Capability::from_name(rest) {
                    Some(capability) => Self::Grant(capability),
                    None => Self::Usage("Usage: /grant history"),
                },
                other => Self::Unknown(other.to_string()),
            },
        }
    }
}

/// Help text sections for the CLI
pub mod help {
    /// Header for the help display
    pub const HEADER: &str = "\n📖 Available Commands:\n";

    /// Shell commands section
    pub const SHELL_COMMANDS: &str = "\
Shell Commands:
  !<command>          Run a command you are asking for yourself
  Example: !rm -rf build/
";

    /// Agent proposals section
    pub const PROPOSALS: &str = "\
Agent Proposals:
  /propose <command>  Propose a command on the agent's behalf
  <text>              Same as /propose
  /history <query>    Search command history (needs consent)
";

    /// Consent section
    pub const CONSENT: &str = "\
Consent:
  /grant history      Allow history lookups for this session
  /consent            Show what has been granted
";

    /// Exit commands section
    pub const EXIT: &str = "\
Exit:
  /exit, /quit        Exit
  Ctrl+D              Exit
";

    /// Keyboard shortcuts section
    pub const KEYBOARD: &str = "\
Keyboard Shortcuts:
  Up/Down             Navigate input history
  Ctrl+R              Reverse search input history
  Ctrl+C              Clear the current line (doesn't exit)
";

    /// Get the complete help text
    pub fn full_text() -> String {
        format!(
            "{}{}\n{}\n{}\n{}\n{}",
            HEADER, SHELL_COMMANDS, PROPOSALS, CONSENT, EXIT, KEYBOARD
        )
    }
}
