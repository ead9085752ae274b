use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::app_constants::LAUNCHER_SCRIPT_STEM;

/// Shell dialect of the generated packaged-mode launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFlavor {
    Batch,
    Posix,
}

impl ScriptFlavor {
    pub fn native() -> Self {
        if cfg!(target_os = "windows") {
            Self::Batch
        } else {
            Self::Posix
        }
    }

    pub fn file_name(self) -> String {
        match self {
            Self::Batch => format!("{LAUNCHER_SCRIPT_STEM}.bat"),
            Self::Posix => format!("{LAUNCHER_SCRIPT_STEM}.sh"),
        }
    }

    /// Command and arguments that run a script of this flavor.
    pub fn invocation(self, script_path: &Path) -> (String, Vec<String>) {
        let script = script_path.to_string_lossy().to_string();
        match self {
            Self::Batch => ("cmd".to_string(), vec!["/C".to_string(), script]),
            Self::Posix => ("/bin/sh".to_string(), vec![script]),
        }
    }
}

fn path_as_str<'a>(path: &'a Path, what: &str) -> Result<&'a str, String> {
    path.to_str()
        .ok_or_else(|| format!("{what} path is not valid UTF-8: {}", path.display()))
}

fn batch_quote(value: &str) -> Result<String, String> {
    if value.contains('"') {
        return Err(format!("Cannot quote path containing '\"' for batch: {value}"));
    }
    Ok(format!("\"{}\"", value.replace('%', "%%")))
}

fn posix_quote(value: &str) -> Result<String, String> {
    shlex::try_quote(value)
        .map(|quoted| quoted.into_owned())
        .map_err(|error| format!("Cannot quote path for shell script: {value}: {error}"))
}

/// Renders a launcher that runs `entry_script` with `python` and exits
/// non-zero when the interpreter fails.
pub fn render_launcher_script(
    flavor: ScriptFlavor,
    python: &Path,
    entry_script: &Path,
) -> Result<String, String> {
    let python = path_as_str(python, "Interpreter")?;
    let entry_script = path_as_str(entry_script, "Backend entry script")?;

    match flavor {
        ScriptFlavor::Batch => Ok(format!(
            "@echo off\r\n{} {}\r\nif errorlevel 1 (\r\n  exit /b 1\r\n)\r\n",
            batch_quote(python)?,
            batch_quote(entry_script)?
        )),
        ScriptFlavor::Posix => Ok(format!(
            "#!/bin/sh\nexec {} {}\n",
            posix_quote(python)?,
            posix_quote(entry_script)?
        )),
    }
}

pub fn write_launcher_script(
    dir: &Path,
    flavor: ScriptFlavor,
    python: &Path,
    entry_script: &Path,
) -> Result<PathBuf, String> {
    let content = render_launcher_script(flavor, python, entry_script)?;
    fs::create_dir_all(dir).map_err(|error| {
        format!(
            "Failed to create launcher script directory {}: {}",
            dir.display(),
            error
        )
    })?;

    let script_path = dir.join(flavor.file_name());
    fs::write(&script_path, content).map_err(|error| {
        format!(
            "Failed to write launcher script {}: {}",
            script_path.display(),
            error
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&script_path, fs::Permissions::from_mode(0o755)).map_err(|error| {
            format!(
                "Failed to mark launcher script executable {}: {}",
                script_path.display(),
                error
            )
        })?;
    }

    Ok(script_path)
}
