mod error;
pub mod repl;
pub mod script;

pub use error::CliError;
pub use repl::run_cli;
pub use script::{parse_script, replay, run_script, ScriptSummary};
