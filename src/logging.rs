use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::{DateTime, SecondsFormat, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopLogCategory {
    Startup,
    Runtime,
    Shutdown,
}

impl DesktopLogCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Runtime => "runtime",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Renders one log line: `<ISO-8601 timestamp>: [<category>] <message>`.
///
/// Newlines inside `message` are flattened so every event occupies exactly
/// one line of the log file.
pub fn format_log_line(
    timestamp: DateTime<Utc>,
    category: DesktopLogCategory,
    message: &str,
) -> String {
    let flattened = message.replace("\r\n", " ").replace(['\n', '\r'], " ");
    let body = if flattened.trim().is_empty() {
        "(empty message)"
    } else {
        flattened.as_str()
    };
    format!(
        "{}: [{}] {}\n",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        category.as_str(),
        body
    )
}

pub fn resolve_desktop_log_path(user_data_dir: Option<PathBuf>, log_file_name: &str) -> PathBuf {
    user_data_dir
        .unwrap_or_else(std::env::temp_dir)
        .join(log_file_name)
}

pub fn append_desktop_log(
    log_path: &Path,
    category: DesktopLogCategory,
    message: &str,
    write_lock: &Mutex<()>,
) -> Result<(), String> {
    let line = format_log_line(Utc::now(), category, message);
    let _guard = match write_lock.lock() {
        Ok(guard) => guard,
        Err(error) => error.into_inner(),
    };

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            format!(
                "Failed to create desktop log directory {}: {}",
                parent.display(),
                error
            )
        })?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|error| format!("Failed to open desktop log {}: {}", log_path.display(), error))?;
    file.write_all(line.as_bytes())
        .map_err(|error| format!("Failed to write desktop log {}: {}", log_path.display(), error))
}

/// Cloneable handle to the desktop log file.
///
/// Clones share one write lock, so lines written from the exit monitor,
/// the readiness worker and the event loop never interleave.
#[derive(Debug, Clone)]
pub struct DesktopLogger {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
    echo_to_stderr: bool,
}

impl DesktopLogger {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
            echo_to_stderr: true,
        }
    }

    pub fn quiet(path: PathBuf) -> Self {
        Self {
            echo_to_stderr: false,
            ..Self::new(path)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&self, category: DesktopLogCategory, message: &str) {
        if self.echo_to_stderr {
            eprintln!("[{}] {}", category.as_str(), message);
        }
        if let Err(error) = append_desktop_log(&self.path, category, message, &self.write_lock) {
            eprintln!("{error}");
        }
    }

    pub fn startup(&self, message: &str) {
        self.log(DesktopLogCategory::Startup, message);
    }

    pub fn runtime(&self, message: &str) {
        self.log(DesktopLogCategory::Runtime, message);
    }

    pub fn shutdown(&self, message: &str) {
        self.log(DesktopLogCategory::Shutdown, message);
    }
}

#[cfg(test)]
pub(crate) fn assert_log_line_shape(line: &str) {
    let (timestamp, message) = line
        .split_once(": ")
        .unwrap_or_else(|| panic!("log line lacks timestamp separator: {line:?}"));
    assert!(
        DateTime::parse_from_rfc3339(timestamp).is_ok(),
        "log line timestamp is not ISO-8601: {line:?}"
    );
    assert!(timestamp.as_bytes()[4] == b'-' && timestamp.as_bytes()[10] == b'T');
    assert!(!message.is_empty(), "log line has empty message: {line:?}");
}
