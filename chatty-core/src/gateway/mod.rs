//! Execution of approved shell commands.
//!
//! The gateway runs only [`ApprovedCommand`]s, which only the broker can
//! create. It trusts that decision and does not re-classify.
//!
//! For file-creating commands it works out which paths the command
//! produced and always reports them with a
//! [`PolicyEvent::FilesCreated`](crate::PolicyEvent::FilesCreated) notice.

mod shell;
mod snapshot;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use serde::{Deserialize, Serialize};

use crate::broker::ApprovedCommand;
use crate::classifier::{creation_targets, prints_created_paths};
use crate::events::{Hooks, PolicyEvent, PolicyHook};
use crate::history::SessionHistory;

pub use shell::{ShellOutput, ShellSession, SystemShell};
pub use snapshot::SnapshotLimits;

use snapshot::Snapshot;

/// Exit code reported when the shell itself could not be run.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// File timestamps come from a coarse clock that can trail `SystemTime`.
const CLOCK_SLACK: Duration = Duration::from_millis(50);

/// Outcome of running one command.
///
/// A non-zero exit code is a normal result, not an engine failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Paths a file-creating command produced, in command order.
    pub created_paths: Vec<String>,
    /// Set when the shell could not be run at all.
    pub fault: Option<String>,
    pub duration: Duration,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && self.fault.is_none()
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Runs approved commands in the session's live shell.
pub struct ExecutionGateway {
    shell: Box<dyn ShellSession>,
    history: Arc<SessionHistory>,
    limits: SnapshotLimits,
    hooks: Hooks,
}

impl ExecutionGateway {
    pub fn new(shell: impl ShellSession + 'static, history: Arc<SessionHistory>) -> Self {
        Self::with_hooks(
            Box::new(shell),
            history,
            SnapshotLimits::default(),
            Hooks::default(),
        )
    }

    pub(crate) fn with_hooks(
        shell: Box<dyn ShellSession>,
        history: Arc<SessionHistory>,
        limits: SnapshotLimits,
        hooks: Hooks,
    ) -> Self {
        Self {
            shell,
            history,
            limits,
            hooks,
        }
    }

    pub fn with_snapshot_limits(mut self, limits: SnapshotLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn add_hook(&self, hook: impl PolicyHook + 'static) {
        self.hooks.add(Arc::new(hook));
    }

    pub fn working_dir(&self) -> &Path {
        self.shell.working_dir()
    }

    /// The log every executed command is appended to.
    pub fn history(&self) -> &Arc<SessionHistory> {
        &self.history
    }

    /// Run an approved command to completion.
    ///
    /// Never fails: a shell that cannot be spawned is reported as exit code
    /// [`SPAWN_FAILURE_EXIT_CODE`] with `fault` set.
    pub async fn execute(&mut self, approved: ApprovedCommand) -> ExecutionResult {
        let id = approved.id();
        let command = approved.command().to_string();
        let cwd = self.shell.working_dir().to_path_buf();
        let creating = approved.risk().is_creating();

        // Record what already exists so created paths can be told apart
        let targets: Vec<(String, bool)> = if creating {
            creation_targets(&command)
                .into_iter()
                .map(|t| {
                    let existed = exists(&resolve_target(&cwd, &t));
                    (t, existed)
                })
                .collect()
        } else {
            Vec::new()
        };
        let before = if creating {
            self.snapshot(&cwd).await
        } else {
            None
        };

        log::info!("Executing {}: {}", id, command);
        self.hooks.emit(PolicyEvent::ExecutionStarted {
            id,
            command: command.clone(),
            timestamp: Instant::now(),
        });

        let started = Instant::now();
        let since = SystemTime::now()
            .checked_sub(CLOCK_SLACK)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let (output, fault) = match self.shell.run(&command).await {
            Ok(output) => (output, None),
            Err(e) => {
                let message = format!("failed to run shell: {}", e);
                log::warn!("{}: {}", id, message);
                let output = ShellOutput {
                    exit_code: SPAWN_FAILURE_EXIT_CODE,
                    stdout: Vec::new(),
                    stderr: message.clone().into_bytes(),
                };
                (output, Some(message))
            }
        };
        let duration = started.elapsed();
        self.history.append(command.as_str());

        let created_paths = if creating {
            let diff = match (&before, self.snapshot(&cwd).await) {
                (Some(before), Some(after)) if !before.is_truncated() && !after.is_truncated() => {
                    after.added_since(before)
                }
                _ => Vec::new(),
            };
            let succeeded = output.exit_code == 0 && fault.is_none();
            let printed = if succeeded && prints_created_paths(&command) {
                printed_paths(&output.stdout)
            } else {
                Vec::new()
            };

            let mut created = collect_created(&cwd, &targets, &printed, diff, succeeded);
            if succeeded && created.is_empty() {
                // Truncated snapshot or a path below the snapshot depth
                let recent = self
                    .recent_entries(&cwd, since, before.unwrap_or_default())
                    .await;
                created = collect_created(&cwd, &[], &[], recent, false);
            }
            created
        } else {
            Vec::new()
        };

        if !created_paths.is_empty() {
            log::info!("{} created {}", id, created_paths.join(", "));
            self.hooks.emit(PolicyEvent::FilesCreated {
                id,
                paths: created_paths.clone(),
            });
        }
        self.hooks.emit(PolicyEvent::ExecutionCompleted {
            id,
            exit_code: output.exit_code,
            fault: fault.clone(),
            duration,
        });

        ExecutionResult {
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
            created_paths,
            fault,
            duration,
        }
    }

    async fn recent_entries(
        &self,
        root: &Path,
        since: SystemTime,
        before: Snapshot,
    ) -> Vec<PathBuf> {
        let root = root.to_path_buf();
        let limits = self.limits;
        let search = move || before.recent_entries(&root, since, limits);
        match tokio::task::spawn_blocking(search).await {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Search for new entries failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn snapshot(&self, root: &Path) -> Option<Snapshot> {
        let root = root.to_path_buf();
        let limits = self.limits;
        match tokio::task::spawn_blocking(move || Snapshot::capture(&root, limits)).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("Snapshot of working directory failed: {}", e);
                None
            }
        }
    }
}

fn exists(path: &Path) -> bool {
    // Dangling symlinks count; `ln -s` may create one
    path.symlink_metadata().is_ok()
}

fn resolve_target(cwd: &Path, target: &str) -> PathBuf {
    if let Some(rest) = target.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    cwd.join(target)
}

/// Non-empty stdout lines, for commands that print what they created.
fn printed_paths(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn overlaps(listed: &[(String, PathBuf)], path: &Path) -> bool {
    listed
        .iter()
        .any(|(_, known)| path.starts_with(known) || known.starts_with(path))
}

/// Build the created-path list.
///
/// Named targets that are new come first, then printed paths that exist,
/// then top-most new entries from the snapshot diff that do not overlap a
/// listed path. If a successful command still has nothing to show, named
/// targets that exist are used.
fn collect_created(
    cwd: &Path,
    targets: &[(String, bool)],
    printed: &[String],
    diff: Vec<PathBuf>,
    succeeded: bool,
) -> Vec<String> {
    let mut listed: Vec<(String, PathBuf)> = Vec::new();

    for (target, existed) in targets {
        let path = resolve_target(cwd, target);
        if !existed && exists(&path) {
            listed.push((target.clone(), path));
        }
    }

    for line in printed {
        let path = resolve_target(cwd, line);
        if exists(&path) && !overlaps(&listed, &path) {
            let shown = line.strip_prefix("./").unwrap_or(line);
            listed.push((shown.to_string(), path));
        }
    }

    for relative in diff {
        let path = cwd.join(&relative);
        if !overlaps(&listed, &path) {
            listed.push((relative.display().to_string(), path));
        }
    }

    if succeeded && listed.is_empty() {
        for (target, _) in targets {
            let path = resolve_target(cwd, target);
            if exists(&path) && !listed.iter().any(|(_, known)| known == &path) {
                listed.push((target.clone(), path));
            }
        }
    }

    listed.into_iter().map(|(shown, _)| shown).collect()
}
