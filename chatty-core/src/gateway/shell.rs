//! The live shell the gateway runs commands in.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::Command;

/// Raw output of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// A live shell session.
///
/// Implementations keep whatever state the session carries between
/// commands; at minimum the working directory.
#[async_trait]
pub trait ShellSession: Send + Sync {
    /// Run a command to completion.
    ///
    /// An `Err` means the shell itself could not be run. A command that ran
    /// and failed is an `Ok` with a non-zero exit code.
    async fn run(&mut self, command: &str) -> std::io::Result<ShellOutput>;

    /// Directory the next command runs in.
    fn working_dir(&self) -> &Path;
}

/// Runs each command as `<program> -c <command>` in a tracked directory.
///
/// A command consisting only of `cd [dir]` changes the tracked directory
/// instead of spawning anything, so later commands run there.
#[derive(Debug, Clone)]
pub struct SystemShell {
    program: String,
    cwd: PathBuf,
    previous: Option<PathBuf>,
}

impl SystemShell {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            cwd: cwd.into(),
            previous: None,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn change_dir(&mut self, target: Option<String>) -> ShellOutput {
        let home = dirs::home_dir();
        let destination = match target.as_deref() {
            None | Some("~") => home.clone(),
            Some("-") => self.previous.clone(),
            Some(dir) => match (dir.strip_prefix("~/"), &home) {
                (Some(rest), Some(home)) => Some(home.join(rest)),
                _ => Some(self.cwd.join(dir)),
            },
        };
        let shown = target.unwrap_or_else(|| "~".to_string());

        let Some(destination) = destination else {
            return cd_failure(&shown, "directory not known");
        };
        match tokio::fs::canonicalize(&destination).await {
            Ok(dir) if dir.is_dir() => {
                log::debug!("Working directory is now {}", dir.display());
                self.previous = Some(std::mem::replace(&mut self.cwd, dir));
                ShellOutput::default()
            }
            Ok(_) => cd_failure(&shown, "Not a directory"),
            Err(_) => cd_failure(&shown, "No such file or directory"),
        }
    }
}

#[async_trait]
impl ShellSession for SystemShell {
    async fn run(&mut self, command: &str) -> std::io::Result<ShellOutput> {
        if let Some(target) = cd_only(command) {
            return Ok(self.change_dir(target).await);
        }

        let output = Command::new(&self.program)
            .arg("-c")
            .arg(command)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(ShellOutput {
            exit_code: exit_code(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn working_dir(&self) -> &Path {
        &self.cwd
    }
}

fn cd_failure(target: &str, message: &str) -> ShellOutput {
    ShellOutput {
        exit_code: 1,
        stdout: Vec::new(),
        stderr: format!("cd: {}: {}\n", target, message).into_bytes(),
    }
}

/// `Some(target)` when the command is a lone `cd`.
fn cd_only(command: &str) -> Option<Option<String>> {
    if command.contains(|c: char| ";&|<>()$`\n".contains(c)) {
        return None;
    }
    let mut words = shlex::split(command)?;
    if words.first().map(String::as_str) != Some("cd") || words.len() > 2 {
        return None;
    }
    Some(if words.len() == 2 { words.pop() } else { None })
}

/// Exit code, or `128 + signal` for a process killed by a signal.
pub(crate) fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}
