#![cfg(unix)]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use paintstore_desktop::{
    backend_readiness::ReadinessPolicy, lifecycle_state::LifecycleStage,
    startup_mode::DesktopMode, BackendStdio, DesktopConfig, DesktopLogger, DesktopShell,
    ExitReport, LaunchPlan, TerminationMethod, WindowContent, WindowHost, WindowSpec,
};

#[derive(Default)]
struct RecordingHost {
    created: Mutex<Vec<WindowSpec>>,
    fail_with: Option<String>,
    failures_left: AtomicUsize,
}

impl RecordingHost {
    fn failing(message: &str) -> Self {
        Self::failing_times(message, usize::MAX)
    }

    fn failing_times(message: &str, times: usize) -> Self {
        Self {
            created: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
            failures_left: AtomicUsize::new(times),
        }
    }

    fn created(&self) -> Vec<WindowSpec> {
        self.created.lock().expect("host lock").clone()
    }
}

impl WindowHost for RecordingHost {
    fn create_window(&self, spec: &WindowSpec) -> Result<(), String> {
        if let Some(message) = &self.fail_with {
            let remaining = self.failures_left.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_left.store(remaining - 1, Ordering::SeqCst);
                return Err(message.clone());
            }
        }
        self.created.lock().expect("host lock").push(spec.clone());
        Ok(())
    }
}

fn test_config(mode: DesktopMode, readiness: ReadinessPolicy) -> DesktopConfig {
    let mut config = DesktopConfig::from_lookup(|_| None);
    config.mode = mode;
    config.readiness = readiness;
    config.backend_url = "http://127.0.0.1:9/".to_string();
    config.graceful_stop_timeout = Duration::from_secs(2);
    config
}

fn sh_plan(script: &str, cwd: &Path, mode: DesktopMode) -> LaunchPlan {
    LaunchPlan {
        cmd: "/bin/sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
        cwd: cwd.to_path_buf(),
        env: Vec::new(),
        stdio: BackendStdio::Discard,
        mode,
        launcher_script: None,
    }
}

fn new_shell(
    dir: &Path,
    mode: DesktopMode,
    readiness: ReadinessPolicy,
    host: RecordingHost,
) -> (Arc<DesktopShell<RecordingHost>>, PathBuf) {
    let log_path = dir.join("app.log");
    let shell = DesktopShell::new(
        test_config(mode, readiness),
        DesktopLogger::quiet(log_path.clone()),
        host,
    );
    (shell, log_path)
}

fn read_log(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}

fn assert_log_lines_are_timestamped(log: &str) {
    assert!(!log.is_empty());
    for line in log.lines() {
        let (timestamp, message) = line
            .split_once(": ")
            .unwrap_or_else(|| panic!("missing separator in {line:?}"));
        let bytes = timestamp.as_bytes();
        assert!(bytes.len() > 11, "short timestamp in {line:?}");
        assert!(bytes[..4].iter().all(u8::is_ascii_digit), "{line:?}");
        assert_eq!(bytes[4], b'-', "{line:?}");
        assert!(bytes[5..7].iter().all(u8::is_ascii_digit), "{line:?}");
        assert_eq!(bytes[7], b'-', "{line:?}");
        assert!(bytes[8..10].iter().all(u8::is_ascii_digit), "{line:?}");
        assert_eq!(bytes[10], b'T', "{line:?}");
        assert!(!message.is_empty(), "{line:?}");
    }
}

fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}

#[test]
fn window_appears_only_after_fixed_delay_in_development_mode() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (shell, _) = new_shell(
        dir.path(),
        DesktopMode::Development,
        ReadinessPolicy::FixedDelay(Duration::from_millis(400)),
        RecordingHost::default(),
    );

    let worker = shell
        .on_ready(Ok(sh_plan("exec sleep 30", dir.path(), DesktopMode::Development)))
        .expect("readiness worker");
    thread::sleep(Duration::from_millis(150));
    assert!(shell.host().created().is_empty());
    assert_eq!(shell.stage(), LifecycleStage::ProcessRunning);

    worker.join().expect("readiness worker");
    let created = shell.host().created();
    assert_eq!(created.len(), 1);
    assert_eq!(
        created[0].content,
        WindowContent::DevServer("http://localhost:3000/".to_string())
    );
    assert_eq!(shell.stage(), LifecycleStage::WindowShown);
    assert_eq!(shell.window_label().as_deref(), Some("main"));

    shell.shutdown("test complete");
}

#[test]
fn packaged_mode_window_loads_bundled_assets() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (shell, _) = new_shell(
        dir.path(),
        DesktopMode::Packaged,
        ReadinessPolicy::FixedDelay(Duration::from_millis(50)),
        RecordingHost::default(),
    );

    shell
        .on_ready(Ok(sh_plan("exec sleep 30", dir.path(), DesktopMode::Packaged)))
        .expect("readiness worker")
        .join()
        .expect("readiness worker");

    let created = shell.host().created();
    assert_eq!(created.len(), 1);
    assert_eq!(
        created[0].content,
        WindowContent::PackagedAsset(PathBuf::from("index.html"))
    );
    shell.shutdown("test complete");
}

#[test]
fn repeated_ready_events_spawn_exactly_one_backend() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (shell, _) = new_shell(
        dir.path(),
        DesktopMode::Development,
        ReadinessPolicy::FixedDelay(Duration::from_millis(50)),
        RecordingHost::default(),
    );
    let plan = sh_plan("exec sleep 30", dir.path(), DesktopMode::Development);

    let worker = shell.on_ready(Ok(plan.clone())).expect("first ready");
    let first_pid = shell.supervisor().pid().expect("backend pid");
    assert!(shell.on_ready(Ok(plan)).is_none());
    worker.join().expect("readiness worker");

    assert_eq!(shell.supervisor().pid(), Some(first_pid));
    assert_eq!(shell.host().created().len(), 1);
    shell.shutdown("test complete");
}

#[test]
fn backend_exit_is_logged_and_window_stays_open() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (shell, log_path) = new_shell(
        dir.path(),
        DesktopMode::Development,
        ReadinessPolicy::FixedDelay(Duration::from_millis(50)),
        RecordingHost::default(),
    );

    shell
        .on_ready(Ok(sh_plan("sleep 0.3; exit 1", dir.path(), DesktopMode::Development)))
        .expect("readiness worker")
        .join()
        .expect("readiness worker");
    assert_eq!(shell.host().created().len(), 1);

    assert!(wait_until(|| shell.supervisor().last_exit().is_some()));
    assert_eq!(
        shell.supervisor().last_exit(),
        Some(ExitReport {
            code: Some(1),
            signal: None,
        })
    );
    thread::sleep(Duration::from_millis(300));

    assert!(!shell.supervisor().is_running());
    assert_eq!(shell.host().created().len(), 1);
    assert!(shell.has_window());
    assert_eq!(shell.stage(), LifecycleStage::WindowShown);

    let log = read_log(&log_path);
    assert!(log.contains("Backend process exited with code 1 and signal null"));
    assert_eq!(log.matches("backend process started").count(), 1);
    assert_log_lines_are_timestamped(&log);
}

#[test]
fn window_all_closed_signals_live_backend_exactly_once() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (shell, log_path) = new_shell(
        dir.path(),
        DesktopMode::Development,
        ReadinessPolicy::FixedDelay(Duration::from_millis(50)),
        RecordingHost::default(),
    );

    shell
        .on_ready(Ok(sh_plan("exec sleep 30", dir.path(), DesktopMode::Development)))
        .expect("readiness worker")
        .join()
        .expect("readiness worker");
    let pid = shell.supervisor().pid().expect("backend pid");

    shell.on_window_closed("main");
    assert!(!shell.has_window());
    let should_quit = shell.on_window_all_closed();
    assert_eq!(should_quit, !cfg!(target_os = "macos"));
    assert!(!shell.supervisor().is_running());

    shell.on_window_all_closed();
    assert!(shell.shutdown("application exit").is_none());
    shell.on_termination_signal();

    let log = read_log(&log_path);
    assert_eq!(
        log.matches(&format!("stopping backend pid {pid}")).count(),
        1
    );
    assert_eq!(shell.stage(), LifecycleStage::Terminated);
    assert_log_lines_are_timestamped(&log);
}

#[test]
fn shutdown_reports_graceful_termination_outcome() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (shell, _) = new_shell(
        dir.path(),
        DesktopMode::Development,
        ReadinessPolicy::FixedDelay(Duration::from_millis(50)),
        RecordingHost::default(),
    );

    shell
        .on_ready(Ok(sh_plan("exec sleep 30", dir.path(), DesktopMode::Development)))
        .expect("readiness worker")
        .join()
        .expect("readiness worker");
    let pid = shell.supervisor().pid().expect("backend pid");

    let outcome = shell.shutdown("termination signal").expect("stop outcome");
    assert_eq!(outcome.pid, pid);
    assert_eq!(outcome.method, TerminationMethod::Graceful);
    assert!(outcome.exit.and_then(|exit| exit.signal).is_some());
}

#[test]
fn termination_signal_before_window_cancels_readiness_wait() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (shell, _) = new_shell(
        dir.path(),
        DesktopMode::Development,
        ReadinessPolicy::FixedDelay(Duration::from_secs(30)),
        RecordingHost::default(),
    );

    let worker = shell
        .on_ready(Ok(sh_plan("exec sleep 30", dir.path(), DesktopMode::Development)))
        .expect("readiness worker");
    let started = Instant::now();
    shell.on_termination_signal();
    worker.join().expect("readiness worker");

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(shell.host().created().is_empty());
    assert!(!shell.supervisor().is_running());
    assert_eq!(shell.stage(), LifecycleStage::Terminated);
}

#[test]
fn spawn_failure_is_logged_but_window_still_opens() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (shell, log_path) = new_shell(
        dir.path(),
        DesktopMode::Development,
        ReadinessPolicy::FixedDelay(Duration::from_millis(50)),
        RecordingHost::default(),
    );
    let mut plan = sh_plan("unused", dir.path(), DesktopMode::Development);
    plan.cmd = dir.path().join("no-such-python").display().to_string();

    shell
        .on_ready(Ok(plan))
        .expect("readiness worker")
        .join()
        .expect("readiness worker");

    assert!(!shell.supervisor().is_running());
    assert_eq!(shell.host().created().len(), 1);
    let log = read_log(&log_path);
    assert!(log.contains("Failed to start backend process"));
    assert!(shell.shutdown("test complete").is_none());
}

#[test]
fn unresolvable_launch_plan_is_logged() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (shell, log_path) = new_shell(
        dir.path(),
        DesktopMode::Packaged,
        ReadinessPolicy::FixedDelay(Duration::from_millis(10)),
        RecordingHost::default(),
    );

    shell
        .on_ready(Err("Packaged resource directory is unavailable.".to_string()))
        .expect("readiness worker")
        .join()
        .expect("readiness worker");

    let log = read_log(&log_path);
    assert!(log.contains("Failed to resolve backend launch plan"));
    assert_eq!(shell.host().created().len(), 1);
}

#[test]
fn window_construction_failure_is_logged_and_not_fatal() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (shell, log_path) = new_shell(
        dir.path(),
        DesktopMode::Development,
        ReadinessPolicy::FixedDelay(Duration::from_millis(50)),
        RecordingHost::failing("webview unavailable"),
    );

    shell
        .on_ready(Ok(sh_plan("exec sleep 30", dir.path(), DesktopMode::Development)))
        .expect("readiness worker")
        .join()
        .expect("readiness worker");

    assert!(!shell.has_window());
    assert_eq!(shell.stage(), LifecycleStage::ProcessRunning);
    assert!(shell.supervisor().is_running());
    let log = read_log(&log_path);
    assert!(log.contains("Error in createWindow: webview unavailable"));
    shell.shutdown("test complete");
}

#[test]
fn activate_recreates_closed_window() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (shell, _) = new_shell(
        dir.path(),
        DesktopMode::Packaged,
        ReadinessPolicy::FixedDelay(Duration::from_millis(20)),
        RecordingHost::default(),
    );

    shell
        .on_ready(Ok(sh_plan("exec sleep 30", dir.path(), DesktopMode::Packaged)))
        .expect("readiness worker")
        .join()
        .expect("readiness worker");
    shell.on_activate();
    assert_eq!(shell.host().created().len(), 1);

    shell.on_window_closed("main");
    shell.on_activate();
    assert_eq!(shell.host().created().len(), 2);
    assert!(shell.has_window());
    shell.shutdown("test complete");
}

#[test]
fn bridge_state_reflects_backend_and_lifecycle() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (shell, _) = new_shell(
        dir.path(),
        DesktopMode::Development,
        ReadinessPolicy::FixedDelay(Duration::from_millis(20)),
        RecordingHost::default(),
    );

    let state = shell.bridge_state();
    assert!(!state.running);
    assert_eq!(state.stage, LifecycleStage::NotStarted);

    shell
        .on_ready(Ok(sh_plan("exec sleep 30", dir.path(), DesktopMode::Development)))
        .expect("readiness worker")
        .join()
        .expect("readiness worker");
    let state = shell.bridge_state();
    assert!(state.running);
    assert_eq!(state.pid, shell.supervisor().pid());
    assert_eq!(state.stage, LifecycleStage::WindowShown);
    assert_eq!(state.backend_url, "http://127.0.0.1:9/");

    shell.shutdown("test complete");
    let state = shell.bridge_state();
    assert!(!state.running);
    assert_eq!(state.stage, LifecycleStage::Terminated);
    assert!(state.last_exit.is_some());
}

#[test]
fn reopen_after_all_windows_closed_recreates_window_without_backend() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (shell, log_path) = new_shell(
        dir.path(),
        DesktopMode::Packaged,
        ReadinessPolicy::FixedDelay(Duration::from_millis(20)),
        RecordingHost::default(),
    );

    shell
        .on_ready(Ok(sh_plan("exec sleep 30", dir.path(), DesktopMode::Packaged)))
        .expect("readiness worker")
        .join()
        .expect("readiness worker");
    shell.on_window_closed("main");
    shell.on_window_all_closed();
    assert_eq!(shell.stage(), LifecycleStage::Terminated);

    shell.on_activate();

    assert_eq!(shell.host().created().len(), 2);
    assert!(shell.has_window());
    assert!(!shell.supervisor().is_running());
    assert_eq!(shell.stage(), LifecycleStage::Terminated);
    let log = read_log(&log_path);
    assert_eq!(log.matches("backend process started").count(), 1);
}

#[test]
fn activate_retries_window_that_failed_at_startup() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (shell, log_path) = new_shell(
        dir.path(),
        DesktopMode::Development,
        ReadinessPolicy::FixedDelay(Duration::from_millis(20)),
        RecordingHost::failing_times("webview unavailable", 1),
    );

    shell
        .on_ready(Ok(sh_plan("exec sleep 30", dir.path(), DesktopMode::Development)))
        .expect("readiness worker")
        .join()
        .expect("readiness worker");
    assert!(!shell.has_window());
    assert_eq!(shell.stage(), LifecycleStage::ProcessRunning);

    shell.on_activate();

    assert_eq!(shell.host().created().len(), 1);
    assert_eq!(shell.stage(), LifecycleStage::WindowShown);
    assert!(read_log(&log_path).contains("Error in createWindow: webview unavailable"));
    shell.shutdown("test complete");
}

#[test]
fn activate_during_readiness_wait_does_not_open_an_extra_window() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (shell, _) = new_shell(
        dir.path(),
        DesktopMode::Development,
        ReadinessPolicy::FixedDelay(Duration::from_millis(300)),
        RecordingHost::default(),
    );

    let worker = shell
        .on_ready(Ok(sh_plan("exec sleep 30", dir.path(), DesktopMode::Development)))
        .expect("readiness worker");
    shell.on_activate();
    assert!(shell.host().created().is_empty());

    worker.join().expect("readiness worker");
    assert_eq!(shell.host().created().len(), 1);
    shell.shutdown("test complete");
}
