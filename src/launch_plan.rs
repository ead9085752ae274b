use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{
    app_constants::{
        BACKEND_ENTRYPOINT, BACKEND_MANIFEST_FILE, BACKEND_PORT_ENV, BACKEND_RESOURCE_DIR,
    },
    app_types::{BackendStdio, LaunchPlan, RuntimeManifest},
    backend_config,
    desktop_config::DesktopConfig,
    launcher_script::{self, ScriptFlavor},
    runtime_paths,
    startup_mode::DesktopMode,
};

/// Host facts the launch plan depends on besides configuration.
#[derive(Debug, Clone)]
pub struct LaunchContext {
    pub resource_dir: Option<PathBuf>,
    pub script_dir: PathBuf,
    pub script_flavor: ScriptFlavor,
    pub port_preset: bool,
}

impl LaunchContext {
    pub fn detect(resource_dir: Option<PathBuf>) -> Self {
        Self {
            resource_dir,
            script_dir: env::temp_dir(),
            script_flavor: ScriptFlavor::native(),
            port_preset: env::var_os(BACKEND_PORT_ENV).is_some(),
        }
    }
}

fn default_python_relative() -> PathBuf {
    if cfg!(target_os = "windows") {
        PathBuf::from("python").join("python.exe")
    } else {
        PathBuf::from("python").join("bin").join("python3")
    }
}

fn backend_env(config: &DesktopConfig, context: &LaunchContext) -> Vec<(String, String)> {
    let mut env = vec![("PYTHONUNBUFFERED".to_string(), "1".to_string())];
    if !context.port_preset {
        if let Some(port) = backend_config::backend_port(&config.backend_url) {
            env.push((BACKEND_PORT_ENV.to_string(), port.to_string()));
        }
    }
    env
}

pub fn resolve_launch_plan(
    config: &DesktopConfig,
    context: &LaunchContext,
) -> Result<LaunchPlan, String> {
    if let Some(custom_cmd) = &config.custom_backend_cmd {
        return resolve_custom_launch(custom_cmd, config, context);
    }

    match config.mode {
        DesktopMode::Development => resolve_dev_launch(config, context),
        DesktopMode::Packaged => resolve_packaged_launch(config, context),
    }
}

fn resolve_custom_launch(
    custom_cmd: &str,
    config: &DesktopConfig,
    context: &LaunchContext,
) -> Result<LaunchPlan, String> {
    let mut pieces = shlex::split(custom_cmd)
        .ok_or_else(|| format!("Invalid custom backend command: {custom_cmd}"))?;
    if pieces.is_empty() {
        return Err("Custom backend command is empty.".to_string());
    }

    let cmd = pieces.remove(0);
    let cwd = config
        .backend_cwd
        .clone()
        .or_else(|| runtime_paths::detect_backend_source_dir(config.backend_source_dir.clone()))
        .unwrap_or_else(runtime_paths::workspace_root_dir);

    Ok(LaunchPlan {
        cmd,
        args: pieces,
        cwd,
        env: backend_env(config, context),
        stdio: BackendStdio::Inherit,
        mode: config.mode,
        launcher_script: None,
    })
}

fn resolve_dev_launch(config: &DesktopConfig, context: &LaunchContext) -> Result<LaunchPlan, String> {
    let source_dir = runtime_paths::detect_backend_source_dir(config.backend_source_dir.clone())
        .ok_or_else(|| {
            format!(
                "Cannot locate backend source directory containing {BACKEND_ENTRYPOINT}. Set {}.",
                crate::app_constants::BACKEND_SOURCE_DIR_ENV
            )
        })?;
    let entry_script = source_dir.join(BACKEND_ENTRYPOINT);

    Ok(LaunchPlan {
        cmd: config.python.clone(),
        args: vec![entry_script.to_string_lossy().to_string()],
        cwd: config.backend_cwd.clone().unwrap_or(source_dir),
        env: backend_env(config, context),
        stdio: BackendStdio::Inherit,
        mode: DesktopMode::Development,
        launcher_script: None,
    })
}

fn read_runtime_manifest(backend_dir: &Path) -> Result<Option<RuntimeManifest>, String> {
    let manifest_path = backend_dir.join(BACKEND_MANIFEST_FILE);
    if !manifest_path.is_file() {
        return Ok(None);
    }
    let manifest_text = fs::read_to_string(&manifest_path).map_err(|error| {
        format!(
            "Failed to read packaged backend manifest {}: {}",
            manifest_path.display(),
            error
        )
    })?;
    serde_json::from_str(&manifest_text).map(Some).map_err(|error| {
        format!(
            "Failed to parse packaged backend manifest {}: {}",
            manifest_path.display(),
            error
        )
    })
}

fn resolve_packaged_launch(
    config: &DesktopConfig,
    context: &LaunchContext,
) -> Result<LaunchPlan, String> {
    let resource_dir = context
        .resource_dir
        .as_ref()
        .ok_or_else(|| "Packaged resource directory is unavailable.".to_string())?;
    let backend_dir = resource_dir.join(BACKEND_RESOURCE_DIR);
    let manifest = read_runtime_manifest(&backend_dir)?;

    let python_path = backend_dir.join(
        manifest
            .as_ref()
            .and_then(|manifest| manifest.python.as_deref())
            .map(PathBuf::from)
            .unwrap_or_else(default_python_relative),
    );
    if !python_path.is_file() {
        return Err(format!(
            "Packaged runtime python executable is missing: {}",
            python_path.display()
        ));
    }

    let entry_script = backend_dir.join(
        manifest
            .as_ref()
            .and_then(|manifest| manifest.entrypoint.as_deref())
            .unwrap_or(BACKEND_ENTRYPOINT),
    );
    if !entry_script.is_file() {
        return Err(format!(
            "Packaged backend entry script is missing: {}",
            entry_script.display()
        ));
    }

    let script_path = launcher_script::write_launcher_script(
        &context.script_dir,
        context.script_flavor,
        &python_path,
        &entry_script,
    )?;
    let (cmd, args) = context.script_flavor.invocation(&script_path);

    Ok(LaunchPlan {
        cmd,
        args,
        cwd: config.backend_cwd.clone().unwrap_or(backend_dir),
        env: backend_env(config, context),
        stdio: BackendStdio::Discard,
        mode: DesktopMode::Packaged,
        launcher_script: Some(script_path),
    })
}
