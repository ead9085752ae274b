use std::{
    fs, io,
    path::PathBuf,
    process::{Child, Command, Stdio},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
    thread,
    time::Duration,
};

use crate::{
    app_constants::EXIT_POLL_INTERVAL_MS,
    app_types::{AtomicFlagGuard, BackendStdio, ExitReport, LaunchPlan, StopOutcome},
    backend_readiness::BackendLiveness,
    logging::DesktopLogger,
    process_control,
};

#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("backend process is already running (pid {pid})")]
    AlreadyRunning { pid: u32 },
    #[error("backend process spawn is already in progress")]
    SpawnInProgress,
    #[error("failed to create backend working directory {}: {source}", .path.display())]
    WorkingDirectory { path: PathBuf, source: io::Error },
    #[error("failed to spawn backend process {command:?}: {source}")]
    Spawn { command: Vec<String>, source: io::Error },
}

/// Owns the single backend child process for the lifetime of the shell.
///
/// The slot holds at most one child. Clones share the slot, so the exit
/// monitor thread and the event loop observe the same process.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    child: Arc<Mutex<Option<Child>>>,
    last_exit: Arc<Mutex<Option<ExitReport>>>,
    is_spawning: Arc<AtomicBool>,
    logger: DesktopLogger,
}

fn build_command(plan: &LaunchPlan) -> Command {
    let mut command = Command::new(&plan.cmd);
    command
        .args(&plan.args)
        .current_dir(&plan.cwd)
        .stdin(Stdio::null());
    for (key, value) in &plan.env {
        command.env(key, value);
    }
    match plan.stdio {
        BackendStdio::Inherit => {
            command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }
        BackendStdio::Discard => {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
    }

    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(crate::app_constants::CREATE_NO_WINDOW);
    }

    command
}

impl ProcessSupervisor {
    pub fn new(logger: DesktopLogger) -> Self {
        Self {
            child: Arc::new(Mutex::new(None)),
            last_exit: Arc::new(Mutex::new(None)),
            is_spawning: Arc::new(AtomicBool::new(false)),
            logger,
        }
    }

    fn lock_child(&self, context: &str) -> MutexGuard<'_, Option<Child>> {
        match self.child.lock() {
            Ok(guard) => guard,
            Err(error) => {
                self.logger.runtime(&format!(
                    "backend process lock poisoned during {context}; recovering"
                ));
                error.into_inner()
            }
        }
    }

    fn lock_last_exit(&self) -> MutexGuard<'_, Option<ExitReport>> {
        match self.last_exit.lock() {
            Ok(guard) => guard,
            Err(error) => error.into_inner(),
        }
    }

    /// Spawns the backend described by `plan`. Fails instead of replacing a
    /// process that already occupies the slot.
    pub fn start(&self, plan: &LaunchPlan) -> Result<u32, SupervisorError> {
        let Some(_spawn_guard) = AtomicFlagGuard::try_set(&self.is_spawning) else {
            return Err(SupervisorError::SpawnInProgress);
        };

        if let Some(child) = self.lock_child("start").as_ref() {
            return Err(SupervisorError::AlreadyRunning { pid: child.id() });
        }

        if !plan.cwd.exists() {
            fs::create_dir_all(&plan.cwd).map_err(|source| {
                self.logger.startup(&format!(
                    "Failed to start backend process: cannot create {}: {source}",
                    plan.cwd.display()
                ));
                SupervisorError::WorkingDirectory {
                    path: plan.cwd.clone(),
                    source,
                }
            })?;
        }

        if let Some(script) = &plan.launcher_script {
            self.logger
                .startup(&format!("Created launcher script at: {}", script.display()));
        }
        self.logger.startup(&format!(
            "launching backend in {} mode: {:?} (cwd {})",
            plan.mode.as_str(),
            plan.debug_command(),
            plan.cwd.display()
        ));

        let child = build_command(plan).spawn().map_err(|source| {
            self.logger
                .startup(&format!("Failed to start backend process: {source}"));
            SupervisorError::Spawn {
                command: plan.debug_command(),
                source,
            }
        })?;
        let pid = child.id();
        *self.lock_child("start") = Some(child);
        *self.lock_last_exit() = None;

        self.logger
            .startup(&format!("backend process started with pid {pid}"));
        self.spawn_exit_monitor(pid);
        Ok(pid)
    }

    fn spawn_exit_monitor(&self, pid: u32) {
        let supervisor = self.clone();
        let spawned = thread::Builder::new()
            .name("backend-exit-monitor".to_string())
            .spawn(move || supervisor.monitor_exit(pid));
        if let Err(error) = spawned {
            self.logger
                .runtime(&format!("failed to spawn backend exit monitor: {error}"));
        }
    }

    fn monitor_exit(&self, pid: u32) {
        let poll_interval = Duration::from_millis(EXIT_POLL_INTERVAL_MS);
        loop {
            thread::sleep(poll_interval);
            let mut guard = self.lock_child("exit monitor");
            let Some(child) = guard.as_mut() else {
                return;
            };
            if child.id() != pid {
                return;
            }
            match child.try_wait() {
                Ok(None) => {}
                Ok(Some(status)) => {
                    guard.take();
                    drop(guard);
                    self.on_exit(ExitReport::from_status(status));
                    return;
                }
                Err(error) => {
                    self.logger.runtime(&format!(
                        "failed to poll backend pid {pid}: {error}; exit monitor stopped"
                    ));
                    return;
                }
            }
        }
    }

    /// Records an unexpected backend exit. No restart is attempted.
    pub fn on_exit(&self, report: ExitReport) {
        self.logger
            .runtime(&format!("Backend process exited with {report}"));
        *self.lock_last_exit() = Some(report);
    }

    /// Terminates the backend if one is running: graceful request, bounded
    /// wait, then forced kill. Returns `None` when there was nothing to stop.
    pub fn stop(&self, grace: Duration) -> Option<StopOutcome> {
        let taken = self.lock_child("stop").take();
        let Some(mut child) = taken else {
            self.logger
                .shutdown("stop requested but no backend process is running");
            return None;
        };

        self.logger.shutdown(&format!(
            "stopping backend pid {} (grace {}ms)",
            child.id(),
            grace.as_millis()
        ));
        let outcome =
            process_control::stop_child_process(&mut child, grace, |message| {
                self.logger.shutdown(message)
            });
        let exit_text = outcome
            .exit
            .map(|exit| exit.to_string())
            .unwrap_or_else(|| "unknown exit status".to_string());
        self.logger.shutdown(&format!(
            "backend pid {} stopped ({:?}): {exit_text}",
            outcome.pid, outcome.method
        ));
        if let Some(exit) = outcome.exit {
            *self.lock_last_exit() = Some(exit);
        }
        Some(outcome)
    }

    pub fn is_running(&self) -> bool {
        self.lock_child("is_running").is_some()
    }

    pub fn is_spawning(&self) -> bool {
        self.is_spawning.load(Ordering::Acquire)
    }

    pub fn pid(&self) -> Option<u32> {
        self.lock_child("pid").as_ref().map(Child::id)
    }

    pub fn last_exit(&self) -> Option<ExitReport> {
        *self.lock_last_exit()
    }

    pub fn liveness(&self) -> BackendLiveness {
        if self.is_running() {
            return BackendLiveness::Running;
        }
        match self.last_exit() {
            Some(report) => BackendLiveness::Exited(report),
            None => BackendLiveness::NotRunning,
        }
    }
}
