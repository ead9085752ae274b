use std::{env, path::PathBuf, time::Duration};

use crate::{
    app_constants::{
        BACKEND_CMD_ENV, BACKEND_CWD_ENV, BACKEND_READY_HTTP_PATH_ENV,
        BACKEND_READY_POLL_INTERVAL_ENV, BACKEND_SOURCE_DIR_ENV, BACKEND_TIMEOUT_ENV,
        BACKEND_URL_ENV, DEFAULT_BACKEND_URL, DEFAULT_DEV_PYTHON, DEFAULT_DEV_SERVER_URL,
        DESKTOP_MODE_ENV, DEV_SERVER_URL_ENV, GRACEFUL_STOP_TIMEOUT_ENV, PYTHON_ENV,
        READINESS_DELAY_ENV, READINESS_ENV,
    },
    backend_config,
    backend_readiness::ReadinessPolicy,
    startup_mode::DesktopMode,
};

/// Startup configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct DesktopConfig {
    pub mode: DesktopMode,
    pub backend_url: String,
    pub dev_server_url: String,
    pub readiness: ReadinessPolicy,
    pub graceful_stop_timeout: Duration,
    pub custom_backend_cmd: Option<String>,
    pub backend_cwd: Option<PathBuf>,
    pub backend_source_dir: Option<PathBuf>,
    pub python: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl DesktopConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = DesktopMode::from_env_value(lookup(DESKTOP_MODE_ENV).as_deref());
        let backend_url = backend_config::normalize_backend_url(
            &lookup(BACKEND_URL_ENV).unwrap_or_default(),
            DEFAULT_BACKEND_URL,
        );
        let dev_server_url = backend_config::normalize_backend_url(
            &lookup(DEV_SERVER_URL_ENV).unwrap_or_default(),
            DEFAULT_DEV_SERVER_URL,
        );

        let readiness = match non_empty(lookup(READINESS_ENV))
            .map(|value| value.to_ascii_lowercase())
            .as_deref()
        {
            Some("fixed") | Some("delay") => ReadinessPolicy::FixedDelay(
                backend_config::resolve_readiness_delay(lookup(READINESS_DELAY_ENV).as_deref()),
            ),
            _ => ReadinessPolicy::Probe {
                timeout: backend_config::resolve_backend_timeout(
                    lookup(BACKEND_TIMEOUT_ENV).as_deref(),
                    mode,
                ),
                poll_interval: backend_config::resolve_ready_poll_interval(
                    lookup(BACKEND_READY_POLL_INTERVAL_ENV).as_deref(),
                ),
                http_path: backend_config::normalize_ready_http_path(
                    lookup(BACKEND_READY_HTTP_PATH_ENV).as_deref(),
                ),
            },
        };

        Self {
            mode,
            backend_url,
            dev_server_url,
            readiness,
            graceful_stop_timeout: backend_config::resolve_graceful_stop_timeout(
                lookup(GRACEFUL_STOP_TIMEOUT_ENV).as_deref(),
            ),
            custom_backend_cmd: non_empty(lookup(BACKEND_CMD_ENV)),
            backend_cwd: non_empty(lookup(BACKEND_CWD_ENV)).map(PathBuf::from),
            backend_source_dir: non_empty(lookup(BACKEND_SOURCE_DIR_ENV)).map(PathBuf::from),
            python: non_empty(lookup(PYTHON_ENV)).unwrap_or_else(|| DEFAULT_DEV_PYTHON.to_string()),
        }
    }
}
