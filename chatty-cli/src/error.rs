use thiserror::Error;

/// Errors that can occur when running the CLI
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Policy error: {0}")]
    Policy(#[from] chatty_core::PolicyError),

    #[error("Input error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Script line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
