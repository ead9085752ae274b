use std::{
    process::{Child, ExitStatus},
    thread,
    time::{Duration, Instant},
};

#[cfg(target_os = "windows")]
use std::process::{Command, Stdio};

use crate::{
    app_constants::EXIT_POLL_INTERVAL_MS,
    app_types::{ExitReport, StopOutcome, TerminationMethod},
};

#[cfg(unix)]
pub fn request_graceful_stop(child: &Child) -> Result<(), String> {
    use nix::{
        sys::signal::{kill, Signal},
        unistd::Pid,
    };

    let raw_pid = i32::try_from(child.id())
        .map_err(|_| format!("Backend pid {} does not fit a signal target.", child.id()))?;
    kill(Pid::from_raw(raw_pid), Signal::SIGTERM)
        .map_err(|error| format!("Failed to send SIGTERM to backend pid {raw_pid}: {error}"))
}

#[cfg(target_os = "windows")]
fn run_taskkill(pid: u32, force: bool) -> Result<(), String> {
    let pid_arg = pid.to_string();
    let mut args = vec!["/pid", pid_arg.as_str(), "/t"];
    if force {
        args.push("/f");
    }
    let flags = args[2..].join(" ");
    let status = Command::new("taskkill")
        .args(&args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .stdin(Stdio::null())
        .status()
        .map_err(|error| format!("Failed to run taskkill {flags} for pid {pid}: {error}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("taskkill {flags} for pid {pid} exited with {status}"))
    }
}

#[cfg(target_os = "windows")]
pub fn request_graceful_stop(child: &Child) -> Result<(), String> {
    run_taskkill(child.id(), false)
}

#[cfg(not(any(unix, target_os = "windows")))]
pub fn request_graceful_stop(_child: &Child) -> Result<(), String> {
    Err("Graceful termination is not supported on this platform.".to_string())
}

/// Kills the backend (and on Windows its process tree). Failures of the
/// tree kill are passed to `log`; the direct kill decides the result.
pub fn force_stop<F>(child: &mut Child, log: F) -> Result<(), String>
where
    F: Fn(&str),
{
    #[cfg(target_os = "windows")]
    {
        if let Err(error) = run_taskkill(child.id(), true) {
            log(&error);
        }
    }
    #[cfg(not(target_os = "windows"))]
    let _ = &log;

    match child.kill() {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
        Err(error) => Err(format!(
            "Failed to kill backend pid {}: {error}",
            child.id()
        )),
    }
}

/// Polls `child` until it exits or `timeout` elapses.
pub fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Option<ExitStatus>, String> {
    let deadline = Instant::now() + timeout;
    let poll_interval = Duration::from_millis(EXIT_POLL_INTERVAL_MS);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {}
            Err(error) => {
                return Err(format!(
                    "Failed to poll backend pid {}: {error}",
                    child.id()
                ))
            }
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(poll_interval.min(deadline - now));
    }
}

/// Asks the backend to exit, waits up to `grace`, then kills it. The child
/// is always reaped before returning when the OS allows it.
pub fn stop_child_process<F>(child: &mut Child, grace: Duration, log: F) -> StopOutcome
where
    F: Fn(&str),
{
    let pid = child.id();

    if let Ok(Some(status)) = child.try_wait() {
        return StopOutcome {
            pid,
            method: TerminationMethod::AlreadyExited,
            exit: Some(ExitReport::from_status(status)),
        };
    }

    match request_graceful_stop(child) {
        Ok(()) => match wait_with_timeout(child, grace) {
            Ok(Some(status)) => {
                return StopOutcome {
                    pid,
                    method: TerminationMethod::Graceful,
                    exit: Some(ExitReport::from_status(status)),
                };
            }
            Ok(None) => log(&format!(
                "backend pid {pid} did not exit within {}ms; forcing termination",
                grace.as_millis()
            )),
            Err(error) => log(&error),
        },
        Err(error) => log(&format!(
            "graceful stop request failed, forcing termination: {error}"
        )),
    }

    if let Err(error) = force_stop(child, &log) {
        log(&error);
    }
    let exit = match child.wait() {
        Ok(status) => Some(ExitReport::from_status(status)),
        Err(error) => {
            log(&format!("failed to reap backend pid {pid}: {error}"));
            None
        }
    };
    StopOutcome {
        pid,
        method: TerminationMethod::Forced,
        exit,
    }
}
