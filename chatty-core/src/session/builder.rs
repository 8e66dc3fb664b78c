//! SessionBuilder for fluent session construction

use std::path::PathBuf;
use std::sync::Arc;

use super::Session;
use crate::broker::PermissionBroker;
use crate::config::SessionConfig;
use crate::consent::ConsentStore;
use crate::error::{PolicyError, Result};
use crate::events::{Hooks, PolicyHook};
use crate::gateway::{ExecutionGateway, ShellSession, SnapshotLimits, SystemShell};
use crate::history::{HistoryQueryAdapter, HistorySource, SessionHistory, ShellHistoryFile};

/// Builder for creating a [`Session`] with fluent configuration
///
/// Without [`with_shell`](Self::with_shell) the session runs commands
/// through a [`SystemShell`] using the configured program and directory.
///
/// # Example
///
/// ```no_run
/// use chatty_core::{PolicyEvent, Session};
///
/// let session = Session::builder()
///     .with_shell_program("bash")
///     .with_working_dir("/tmp")
///     .with_max_history_results(20)
///     .add_hook(|event: &PolicyEvent| eprintln!("{}", event.name()))
///     .build()?;
/// # Ok::<(), chatty_core::PolicyError>(())
/// ```
pub struct SessionBuilder {
    config: SessionConfig,
    shell: Option<Box<dyn ShellSession>>,
    sources: Vec<Arc<dyn HistorySource>>,
    hooks: Vec<Arc<dyn PolicyHook>>,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            shell: None,
            sources: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Program for the default [`SystemShell`].
    pub fn with_shell_program(mut self, program: impl Into<String>) -> Self {
        self.config.shell = program.into();
        self
    }

    /// Starting directory for the default [`SystemShell`].
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.working_dir = Some(dir.into());
        self
    }

    /// Use a custom live shell. Its working directory wins over the
    /// configured one.
    pub fn with_shell(mut self, shell: impl ShellSession + 'static) -> Self {
        self.shell = Some(Box::new(shell));
        self
    }

    /// Search a shell history file on lookups.
    pub fn with_history_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.history_files.push(path.into());
        self
    }

    /// Search a custom history source on lookups.
    pub fn with_history_source(mut self, source: impl HistorySource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    pub fn with_max_history_results(mut self, max: usize) -> Self {
        self.config.max_history_results = max;
        self
    }

    pub fn with_snapshot_limits(mut self, limits: SnapshotLimits) -> Self {
        self.config.snapshot_depth = limits.depth;
        self.config.snapshot_limit = limits.max_entries;
        self
    }

    pub fn with_consent_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.config.consent_guidance = guidance.into();
        self
    }

    /// Register an event hook
    pub fn add_hook(mut self, hook: impl PolicyHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Build the session.
    ///
    /// Fails when the working directory cannot be determined or does not
    /// exist.
    pub fn build(self) -> Result<Session> {
        let mut config = self.config;

        let hooks = Hooks::default();
        for hook in self.hooks {
            hooks.add(hook);
        }

        let shell: Box<dyn ShellSession> = match self.shell {
            Some(shell) => shell,
            None => {
                let dir = match &config.working_dir {
                    Some(dir) => dir.clone(),
                    None => std::env::current_dir().map_err(|e| {
                        PolicyError::Config(format!("cannot read current directory: {}", e))
                    })?,
                };
                if !dir.is_dir() {
                    return Err(PolicyError::Config(format!(
                        "working directory {} does not exist",
                        dir.display()
                    )));
                }
                Box::new(SystemShell::new(config.shell.clone(), dir))
            }
        };
        config.working_dir = Some(shell.working_dir().to_path_buf());

        let session_history = Arc::new(SessionHistory::new());
        let mut history = HistoryQueryAdapter::new(config.max_history_results);
        for path in &config.history_files {
            history.add_source(Arc::new(ShellHistoryFile::new(path)));
        }
        for source in self.sources {
            history.add_source(source);
        }
        history.add_source(session_history.clone());

        let broker = PermissionBroker::with_hooks(config.consent_guidance.clone(), hooks.clone());
        let gateway = ExecutionGateway::with_hooks(
            shell,
            session_history,
            config.snapshot_limits(),
            hooks.clone(),
        );

        log::info!(
            "Session started in {} ({} history sources)",
            gateway.working_dir().display(),
            config.history_files.len() + 1
        );

        Ok(Session {
            config,
            consent: Arc::new(ConsentStore::new()),
            broker,
            gateway,
            history,
            hooks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedShell;

    #[test]
    fn test_build_with_missing_working_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = SessionBuilder::new()
            .with_working_dir(dir.path().join("missing"))
            .build();
        assert!(matches!(result, Err(PolicyError::Config(_))));
    }

    #[test]
    fn test_build_with_system_shell() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionBuilder::new()
            .with_working_dir(dir.path())
            .with_shell_program("bash")
            .build()
            .unwrap();
        assert_eq!(session.working_dir(), dir.path());
        assert_eq!(session.config().shell, "bash");
    }

    #[test]
    fn test_custom_shell_directory_wins() {
        let configured = tempfile::tempdir().unwrap();
        let actual = tempfile::tempdir().unwrap();
        let session = SessionBuilder::new()
            .with_working_dir(configured.path())
            .with_shell(ScriptedShell::new(actual.path()))
            .build()
            .unwrap();
        assert_eq!(session.working_dir(), actual.path());
        assert_eq!(session.config().working_dir.as_deref(), Some(actual.path()));
    }

    #[test]
    fn test_config_carries_over() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionBuilder::new()
            .with_shell(ScriptedShell::new(dir.path()))
            .with_max_history_results(7)
            .with_consent_guidance("ask nicely")
            .build()
            .unwrap();
        assert_eq!(session.config().max_history_results, 7);
        assert_eq!(session.config().consent_guidance, "ask nicely");
    }
}
