use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::{Duration, Instant},
};

use crate::{
    app_constants::DEFAULT_BACKEND_PING_TIMEOUT_MS, app_types::ExitReport, backend_http,
    http_response::is_success_status,
};

const CANCEL_CHECK_SLICE: Duration = Duration::from_millis(25);

/// How the shell decides the backend is ready enough to show the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessPolicy {
    FixedDelay(Duration),
    Probe {
        timeout: Duration,
        poll_interval: Duration,
        http_path: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendLiveness {
    Running,
    Exited(ExitReport),
    NotRunning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessOutcome {
    DelayElapsed,
    Ready { elapsed: Duration },
    TimedOut { elapsed: Duration },
    BackendExited(ExitReport),
    BackendNotRunning,
    Cancelled,
}

impl ReadinessOutcome {
    pub fn should_create_window(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    pub fn describe(&self) -> String {
        match self {
            Self::DelayElapsed => "fixed readiness delay elapsed".to_string(),
            Self::Ready { elapsed } => {
                format!("backend became ready after {}ms", elapsed.as_millis())
            }
            Self::TimedOut { elapsed } => format!(
                "timed out after {}ms waiting for backend readiness",
                elapsed.as_millis()
            ),
            Self::BackendExited(report) => {
                format!("backend exited before becoming ready ({report})")
            }
            Self::BackendNotRunning => "backend process is not running".to_string(),
            Self::Cancelled => "readiness wait cancelled by shutdown".to_string(),
        }
    }
}

/// Sleeps for `duration`, returning early with `true` once `cancel` is set.
pub fn sleep_unless_cancelled(duration: Duration, cancel: &AtomicBool) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if cancel.load(Ordering::Acquire) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        thread::sleep(CANCEL_CHECK_SLICE.min(deadline - now));
    }
}

pub fn wait_for_backend<L>(
    policy: &ReadinessPolicy,
    backend_url: &str,
    liveness: L,
    cancel: &AtomicBool,
) -> ReadinessOutcome
where
    L: Fn() -> BackendLiveness,
{
    match policy {
        ReadinessPolicy::FixedDelay(delay) => {
            if sleep_unless_cancelled(*delay, cancel) {
                ReadinessOutcome::Cancelled
            } else {
                ReadinessOutcome::DelayElapsed
            }
        }
        ReadinessPolicy::Probe {
            timeout,
            poll_interval,
            http_path,
        } => {
            let start_time = Instant::now();
            let probe_timeout = Duration::from_millis(DEFAULT_BACKEND_PING_TIMEOUT_MS);
            loop {
                if cancel.load(Ordering::Acquire) {
                    return ReadinessOutcome::Cancelled;
                }

                if let Ok(code) = backend_http::probe_backend_http(backend_url, http_path, probe_timeout)
                {
                    if is_success_status(code) {
                        return ReadinessOutcome::Ready {
                            elapsed: start_time.elapsed(),
                        };
                    }
                }

                match liveness() {
                    BackendLiveness::Running => {}
                    BackendLiveness::Exited(report) => {
                        return ReadinessOutcome::BackendExited(report);
                    }
                    BackendLiveness::NotRunning => return ReadinessOutcome::BackendNotRunning,
                }

                let elapsed = start_time.elapsed();
                if elapsed >= *timeout {
                    return ReadinessOutcome::TimedOut { elapsed };
                }

                if sleep_unless_cancelled(*poll_interval, cancel) {
                    return ReadinessOutcome::Cancelled;
                }
            }
        }
    }
}
