use std::{env, path::PathBuf};

use crate::app_constants::{APP_NAME, BACKEND_ENTRYPOINT, USER_DATA_DIR_ENV};

/// Per-user application data directory (`%APPDATA%\Paint Store`,
/// `~/.config/Paint Store`, `~/Library/Application Support/Paint Store`).
pub fn default_user_data_dir() -> Option<PathBuf> {
    if let Ok(raw) = env::var(USER_DATA_DIR_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

pub fn workspace_root_dir() -> PathBuf {
    let candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    candidate.canonicalize().unwrap_or(candidate)
}

/// Finds a directory holding the backend entry script, trying the explicit
/// override first and then the usual checkout layouts.
pub fn detect_backend_source_dir(explicit: Option<PathBuf>) -> Option<PathBuf> {
    let workspace_root = workspace_root_dir();
    let candidates = explicit.into_iter().chain([
        workspace_root.join("backend"),
        workspace_root.join("..").join("backend"),
    ]);
    for candidate in candidates {
        if candidate.join(BACKEND_ENTRYPOINT).is_file() {
            return Some(candidate.canonicalize().unwrap_or(candidate));
        }
    }
    None
}
