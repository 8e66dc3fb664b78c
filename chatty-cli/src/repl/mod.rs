//! Interactive REPL for a chatty session

mod approval;
mod commands;
mod core;
mod presentation;
mod status;

use crate::error::CliError;
use commands::help;
use core::{input_prompt, print_input_padding, print_welcome, reset_input_style};
use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::{Cmd, DefaultEditor, KeyEvent};
use status::{clear_status_line, update_status_line};

use chatty_core::{Outcome, ProposedAction, Session};

pub use approval::{
    print_confirmation, print_request_header, prompt_for_confirmation, read_input, Choice,
    ConfirmationPrompter, DefaultPrompter, SimplePrompter,
};
pub use commands::{CommandType, Request};
pub use presentation::{
    format_created_notice, format_denial, format_history, format_result, new_event_queue,
    print_outcome, EventPresenter, EventQueue, PresentationHook,
};

/// Submit an action and see it through to a final outcome
///
/// A confirmation request is put to `prompter` and the answer is applied
/// before returning, so the result is never
/// [`Outcome::NeedsConfirmation`]. An abandoned prompt cancels the request.
pub async fn submit_and_settle(
    session: &mut Session,
    action: ProposedAction,
    prompter: &dyn ConfirmationPrompter,
) -> Result<Outcome, CliError> {
    let outcome = session.submit(action).await?;
    settle(session, outcome, prompter).await
}

async fn settle(
    session: &mut Session,
    outcome: Outcome,
    prompter: &dyn ConfirmationPrompter,
) -> Result<Outcome, CliError> {
    let Outcome::NeedsConfirmation(request) = outcome else {
        return Ok(outcome);
    };

    match prompter.prompt(&request) {
        Some(response) => Ok(session.resolve(&request.token, response).await?),
        None => {
            let denial = session.cancel_pending(Some("cancelled at the prompt".to_string()))?;
            Ok(Outcome::Denied(denial))
        }
    }
}

/// Run an interactive REPL over the session
///
/// This provides a command-line interface with:
/// - Up/down arrow history
/// - Ctrl+R reverse search
/// - `!cmd` for the human's own commands, plain text for agent proposals
/// - Confirmation prompts for file-altering proposals
/// - Creation notices for every file-creating command
///
/// # Errors
///
/// Returns `CliError` which can be:
/// - `Readline` - Input/readline errors
/// - `Io` - Filesystem errors (input history loading/saving)
///
/// # Example
/// ```ignore
/// use chatty_core::Session;
/// use chatty_cli::run_cli;
///
/// let session = Session::builder().with_shell_program("bash").build()?;
/// run_cli(session).await?;
/// ```
pub async fn run_cli(mut session: Session) -> Result<(), CliError> {
    let queue = new_event_queue();
    session.add_hook(PresentationHook::new(queue.clone()));
    let presenter = EventPresenter::new(queue);
    let prompter = SimplePrompter;

    print_welcome(&session);

    let mut rl = DefaultEditor::with_config(Config::default())?;

    // Bind Ctrl-J to insert newline instead of submitting
    rl.bind_sequence(KeyEvent::ctrl('J'), Cmd::Newline);

    let history_path = dirs::cache_dir()
        .map(|p| p.join("chatty/history.txt"))
        .unwrap_or_else(|| ".chatty/history.txt".into());

    if history_path.exists() {
        rl.load_history(&history_path).ok();
    }

    let mut last_exit_code = None;

    loop {
        update_status_line(&session, last_exit_code);

        print_input_padding();
        let readline = rl.readline(input_prompt());
        reset_input_style();

        match readline {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                rl.add_history_entry(line)?;

                let action = match Request::from_input(line) {
                    Request::Submit(action) => action,
                    Request::Grant(capability) => {
                        session.grant(capability);
                        presenter.flush();
                        continue;
                    }
                    Request::ShowConsent => {
                        print!(
                            "{}",
                            presentation::format_grants(&session.consent().grants())
                        );
                        continue;
                    }
                    Request::Help => {
                        print!("{}", help::full_text());
                        continue;
                    }
                    Request::Exit => break,
                    Request::Usage(usage) => {
                        println!("{}", usage);
                        continue;
                    }
                    Request::Unknown(command) => {
                        eprintln!(
                            "Unknown command: {}. Type /help for available commands.",
                            command
                        );
                        continue;
                    }
                };

                println!();
                match submit_and_settle(&mut session, action, &prompter).await {
                    Ok(outcome) => {
                        if let Outcome::Executed(result) = &outcome {
                            last_exit_code = Some(result.exit_code);
                        }
                        print_outcome(&outcome);
                        presenter.flush();
                    }
                    Err(e) => {
                        log::warn!("Action failed: {}", e);
                        eprintln!("❌ Error: {}", e);
                    }
                }
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C - just continue
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    clear_status_line();

    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    rl.save_history(&history_path)?;

    println!("\n👋 Goodbye!\n");
    Ok(())
}
