pub const APP_NAME: &str = "Paint Store";

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000/";
pub const BACKEND_URL_ENV: &str = "PAINTSTORE_BACKEND_URL";
pub const DEFAULT_DEV_SERVER_URL: &str = "http://localhost:3000/";
pub const DEV_SERVER_URL_ENV: &str = "PAINTSTORE_DEV_SERVER_URL";
pub const DESKTOP_MODE_ENV: &str = "PAINTSTORE_DESKTOP_MODE";

pub const BACKEND_CMD_ENV: &str = "PAINTSTORE_BACKEND_CMD";
pub const BACKEND_CWD_ENV: &str = "PAINTSTORE_BACKEND_CWD";
pub const BACKEND_SOURCE_DIR_ENV: &str = "PAINTSTORE_BACKEND_SOURCE_DIR";
pub const PYTHON_ENV: &str = "PAINTSTORE_PYTHON";
pub const DEFAULT_DEV_PYTHON: &str = "python";
pub const BACKEND_ENTRYPOINT: &str = "server.py";
pub const BACKEND_RESOURCE_DIR: &str = "backend";
pub const BACKEND_MANIFEST_FILE: &str = "runtime-manifest.json";
pub const BACKEND_PORT_ENV: &str = "PORT";
pub const LAUNCHER_SCRIPT_STEM: &str = "start_python";

pub const READINESS_ENV: &str = "PAINTSTORE_READINESS";
pub const READINESS_DELAY_ENV: &str = "PAINTSTORE_READINESS_DELAY_MS";
pub const DEFAULT_READINESS_DELAY_MS: u64 = 2_000;
pub const BACKEND_TIMEOUT_ENV: &str = "PAINTSTORE_BACKEND_TIMEOUT_MS";
pub const DEV_BACKEND_TIMEOUT_MS: u64 = 20_000;
pub const PACKAGED_BACKEND_TIMEOUT_MS: u64 = 60_000;
pub const BACKEND_READY_POLL_INTERVAL_ENV: &str = "PAINTSTORE_BACKEND_READY_POLL_INTERVAL_MS";
pub const DEFAULT_BACKEND_READY_POLL_INTERVAL_MS: u64 = 300;
pub const BACKEND_READY_POLL_INTERVAL_MIN_MS: u64 = 50;
pub const BACKEND_READY_POLL_INTERVAL_MAX_MS: u64 = 10_000;
pub const BACKEND_READY_HTTP_PATH_ENV: &str = "PAINTSTORE_BACKEND_READY_HTTP_PATH";
pub const DEFAULT_BACKEND_READY_HTTP_PATH: &str = "/health";
pub const DEFAULT_BACKEND_PING_TIMEOUT_MS: u64 = 800;

pub const GRACEFUL_STOP_TIMEOUT_ENV: &str = "PAINTSTORE_GRACEFUL_STOP_TIMEOUT_MS";
pub const DEFAULT_GRACEFUL_STOP_TIMEOUT_MS: u64 = 5_000;
pub const GRACEFUL_STOP_TIMEOUT_MIN_MS: u64 = 100;
pub const GRACEFUL_STOP_TIMEOUT_MAX_MS: u64 = 60_000;
pub const EXIT_POLL_INTERVAL_MS: u64 = 100;

pub const USER_DATA_DIR_ENV: &str = "PAINTSTORE_USER_DATA_DIR";
pub const DESKTOP_LOG_FILE: &str = "app.log";

pub const MAIN_WINDOW_LABEL: &str = "main";
pub const MAIN_WINDOW_WIDTH: f64 = 800.0;
pub const MAIN_WINDOW_HEIGHT: f64 = 600.0;
pub const PACKAGED_INDEX_PAGE: &str = "index.html";

#[cfg(target_os = "windows")]
pub const CREATE_NO_WINDOW: u32 = 0x0800_0000;
