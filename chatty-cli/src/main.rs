//! chatty
//!
//! Drives a tool-use policy session from the terminal: type proposals,
//! answer confirmations, grant consent, or replay a script of proposals.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatty_cli::repl::SimplePrompter;
use chatty_cli::{run_cli, run_script};
use chatty_core::{Session, ShellHistoryFile};

/// chatty - a permission broker between an agent and your shell
#[derive(Parser, Debug)]
#[command(name = "chatty", version)]
#[command(about = "Confirm destructive commands before an agent runs them")]
struct Args {
    /// Shell that runs commands as `<shell> -c <command>`
    #[arg(long, env = "CHATTY_SHELL", default_value = "sh")]
    shell: String,

    /// Starting directory (defaults to the current directory)
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Shell history file searched by history lookups (defaults to ~/.bash_history)
    #[arg(long, env = "HISTFILE")]
    history_file: Option<PathBuf>,

    /// Search only the commands run in this session
    #[arg(long)]
    no_history_file: bool,

    /// Replay a JSON Lines file of proposals instead of starting the REPL
    #[arg(long)]
    script: Option<PathBuf>,

    /// Cap on entries returned by one history lookup (0 for no cap)
    #[arg(long)]
    max_history_results: Option<usize>,

    /// Raise the log level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    fn history_file(&self) -> Option<PathBuf> {
        if self.no_history_file {
            return None;
        }
        self.history_file
            .clone()
            .or_else(|| ShellHistoryFile::bash_default().map(|f| f.path().to_path_buf()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_level())),
        )
        .init();

    let mut builder = Session::builder().with_shell_program(&args.shell);
    if let Some(dir) = &args.workdir {
        builder = builder.with_working_dir(dir);
    }
    if let Some(path) = args.history_file() {
        log::info!("Searching history file {}", path.display());
        builder = builder.with_history_file(path);
    }
    if let Some(max) = args.max_history_results {
        builder = builder.with_max_history_results(max);
    }
    let mut session = builder.build()?;

    match &args.script {
        Some(path) => {
            let summary = run_script(&mut session, path, &SimplePrompter).await?;
            println!("\n{}", summary);
        }
        None => run_cli(session).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["chatty"]).unwrap();
        assert_eq!(args.log_level(), "warn");
        assert!(args.script.is_none());
        assert!(!args.no_history_file);
    }

    #[test]
    fn verbosity_raises_log_level() {
        let args = Args::try_parse_from(["chatty", "-vv"]).unwrap();
        assert_eq!(args.log_level(), "debug");
    }

    #[test]
    fn no_history_file_wins() {
        let args = Args::try_parse_from(["chatty", "--no-history-file"]).unwrap();
        assert!(args.history_file().is_none());
    }

    #[test]
    fn explicit_history_file() {
        let args =
            Args::try_parse_from(["chatty", "--history-file", "/tmp/zsh_history"]).unwrap();
        assert_eq!(args.history_file(), Some(PathBuf::from("/tmp/zsh_history")));
    }
}
