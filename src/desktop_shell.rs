use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
    thread::{self, JoinHandle},
};

use crate::{
    app_types::{BackendBridgeState, LaunchPlan, StopOutcome},
    backend_readiness,
    desktop_config::DesktopConfig,
    lifecycle_state::{LifecycleStage, LifecycleStateMachine},
    logging::DesktopLogger,
    supervisor::ProcessSupervisor,
    window_host::{WindowContent, WindowHost, WindowSpec},
};

/// Composition root of the desktop application: owns the backend
/// supervisor, the window host and the lifecycle, and reacts to the host
/// runtime's events.
pub struct DesktopShell<H: WindowHost> {
    config: DesktopConfig,
    logger: DesktopLogger,
    supervisor: ProcessSupervisor,
    host: H,
    lifecycle: Mutex<LifecycleStateMachine>,
    window: Mutex<Option<String>>,
    cancel: AtomicBool,
    startup_window_settled: AtomicBool,
    quit_when_all_windows_closed: bool,
}

impl<H: WindowHost> DesktopShell<H> {
    pub fn new(config: DesktopConfig, logger: DesktopLogger, host: H) -> Arc<Self> {
        Arc::new(Self {
            supervisor: ProcessSupervisor::new(logger.clone()),
            config,
            logger,
            host,
            lifecycle: Mutex::new(LifecycleStateMachine::default()),
            window: Mutex::new(None),
            cancel: AtomicBool::new(false),
            startup_window_settled: AtomicBool::new(false),
            quit_when_all_windows_closed: !cfg!(target_os = "macos"),
        })
    }

    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    pub fn logger(&self) -> &DesktopLogger {
        &self.logger
    }

    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, LifecycleStateMachine> {
        match self.lifecycle.lock() {
            Ok(guard) => guard,
            Err(error) => {
                self.logger
                    .runtime("lifecycle lock poisoned; recovering");
                error.into_inner()
            }
        }
    }

    fn lock_window(&self) -> MutexGuard<'_, Option<String>> {
        match self.window.lock() {
            Ok(guard) => guard,
            Err(error) => {
                self.logger.runtime("window slot lock poisoned; recovering");
                error.into_inner()
            }
        }
    }

    pub fn stage(&self) -> LifecycleStage {
        self.lock_lifecycle().stage()
    }

    pub fn window_label(&self) -> Option<String> {
        self.lock_window().clone()
    }

    pub fn has_window(&self) -> bool {
        self.lock_window().is_some()
    }

    fn advance(&self, next: LifecycleStage) -> bool {
        match self.lock_lifecycle().advance(next) {
            Ok(()) => true,
            Err(error) => {
                self.logger.runtime(&error);
                false
            }
        }
    }

    /// Handles the application-ready event: launches the backend and spawns
    /// the worker that shows the window once the readiness wait completes.
    ///
    /// Only the first call has any effect. A launch failure is logged and the
    /// window is still shown.
    pub fn on_ready(self: &Arc<Self>, plan: Result<LaunchPlan, String>) -> Option<JoinHandle<()>> {
        {
            let mut lifecycle = self.lock_lifecycle();
            if let Err(error) = lifecycle.advance(LifecycleStage::ProcessStarting) {
                drop(lifecycle);
                self.logger
                    .startup(&format!("application-ready ignored: {error}"));
                return None;
            }
        }
        self.logger.startup(&format!(
            "application ready in {} mode; backend url {}",
            self.config.mode.as_str(),
            self.config.backend_url
        ));

        match plan {
            Ok(plan) => match self.supervisor.start(&plan) {
                Ok(_) => {
                    if self.lock_lifecycle().is_shutting_down() {
                        self.supervisor.stop(self.config.graceful_stop_timeout);
                    }
                }
                Err(error) => self
                    .logger
                    .startup(&format!("Error in startBackend: {error}")),
            },
            Err(error) => self
                .logger
                .startup(&format!("Failed to resolve backend launch plan: {error}")),
        }

        if !self.advance(LifecycleStage::ProcessRunning) {
            return None;
        }

        let shell = Arc::clone(self);
        match thread::Builder::new()
            .name("window-readiness".to_string())
            .spawn(move || shell.show_window_when_ready())
        {
            Ok(handle) => Some(handle),
            Err(error) => {
                self.logger
                    .startup(&format!("failed to spawn readiness worker: {error}"));
                None
            }
        }
    }

    fn show_window_when_ready(&self) {
        let outcome = backend_readiness::wait_for_backend(
            &self.config.readiness,
            &self.config.backend_url,
            || self.supervisor.liveness(),
            &self.cancel,
        );
        self.logger.startup(&outcome.describe());

        if outcome.should_create_window() && !self.lock_lifecycle().is_shutting_down() {
            let _ = self.create_window();
        }
        self.startup_window_settled.store(true, Ordering::Release);
    }

    /// Builds the main window for the configured mode and records it.
    pub fn create_window(&self) -> Result<(), String> {
        let spec = WindowSpec::main_window(self.config.mode, &self.config.dev_server_url);
        if let Err(error) = self.host.create_window(&spec) {
            self.logger
                .startup(&format!("Error in createWindow: {error}"));
            return Err(error);
        }

        *self.lock_window() = Some(spec.label.clone());
        let source = match &spec.content {
            WindowContent::DevServer(url) => url.clone(),
            WindowContent::PackagedAsset(path) => path.display().to_string(),
        };
        self.logger
            .startup(&format!("window '{}' created, loading {source}", spec.label));

        let mut lifecycle = self.lock_lifecycle();
        if lifecycle.stage() == LifecycleStage::ProcessRunning {
            let _ = lifecycle.advance(LifecycleStage::WindowShown);
        }
        Ok(())
    }

    /// Re-creates the window when the app is activated without one, e.g.
    /// from the macOS dock after the last window closed. Waits until the
    /// startup window attempt has finished and never relaunches the backend.
    pub fn on_activate(&self) {
        if !self.startup_window_settled.load(Ordering::Acquire) || self.has_window() {
            return;
        }
        self.logger.runtime(&format!(
            "application re-activated without a window (stage {})",
            self.stage().as_str()
        ));
        let _ = self.create_window();
    }

    pub fn on_window_closed(&self, label: &str) {
        let mut window = self.lock_window();
        if window.as_deref() == Some(label) {
            *window = None;
            drop(window);
            self.logger.runtime(&format!("window '{label}' closed"));
        }
    }

    /// Stops the backend and reports whether the application should quit.
    pub fn on_window_all_closed(&self) -> bool {
        self.logger.shutdown("all windows closed");
        self.shutdown("window-all-closed");
        self.quit_when_all_windows_closed
    }

    pub fn on_termination_signal(&self) {
        self.logger.shutdown("received termination signal");
        self.shutdown("termination signal");
    }

    /// Enters shutdown and stops the backend. Only the first call stops
    /// anything; later calls return `None`.
    pub fn shutdown(&self, reason: &str) -> Option<StopOutcome> {
        self.cancel.store(true, Ordering::Release);
        if !self.lock_lifecycle().begin_shutdown() {
            return None;
        }

        self.logger.shutdown(&format!("shutting down: {reason}"));
        let outcome = self.supervisor.stop(self.config.graceful_stop_timeout);
        self.lock_lifecycle().mark_terminated();
        outcome
    }

    pub fn bridge_state(&self) -> BackendBridgeState {
        BackendBridgeState {
            running: self.supervisor.is_running(),
            spawning: self.supervisor.is_spawning(),
            pid: self.supervisor.pid(),
            stage: self.stage(),
            mode: self.config.mode,
            backend_url: self.config.backend_url.clone(),
            last_exit: self.supervisor.last_exit(),
        }
    }
}
