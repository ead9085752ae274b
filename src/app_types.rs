use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::PathBuf,
    process::ExitStatus,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::{lifecycle_state::LifecycleStage, startup_mode::DesktopMode};

#[derive(Debug, Deserialize)]
pub struct RuntimeManifest {
    pub python: Option<String>,
    pub entrypoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStdio {
    Inherit,
    Discard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub cmd: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
    pub stdio: BackendStdio,
    pub mode: DesktopMode,
    pub launcher_script: Option<PathBuf>,
}

impl LaunchPlan {
    pub fn debug_command(&self) -> Vec<String> {
        let mut parts = vec![self.cmd.clone()];
        parts.extend(self.args.clone());
        parts
    }
}

/// How the backend process ended, as reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExitReport {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl ExitReport {
    pub fn from_status(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

impl fmt::Display for ExitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self
            .code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "null".to_string());
        let signal = self
            .signal
            .map(|signal| signal.to_string())
            .unwrap_or_else(|| "null".to_string());
        write!(f, "code {code} and signal {signal}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TerminationMethod {
    AlreadyExited,
    Graceful,
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StopOutcome {
    pub pid: u32,
    pub method: TerminationMethod,
    pub exit: Option<ExitReport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendBridgeState {
    pub running: bool,
    pub spawning: bool,
    pub pid: Option<u32>,
    pub stage: LifecycleStage,
    pub mode: DesktopMode,
    pub backend_url: String,
    pub last_exit: Option<ExitReport>,
}

pub struct AtomicFlagGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> AtomicFlagGuard<'a> {
    pub fn try_set(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self { flag })
    }
}

impl Drop for AtomicFlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
