use std::sync::Arc;
use tauri::{Manager, RunEvent, WindowEvent};

use paintstore_desktop::{
    app_constants::DESKTOP_LOG_FILE,
    launch_plan::{self, LaunchContext},
    logging, runtime_paths, signals, DesktopConfig, DesktopLogger, DesktopShell,
};

use crate::{exit_events, main_window::TauriWindowHost, window_actions, AppShell};

pub(crate) fn run() {
    let logger = DesktopLogger::new(logging::resolve_desktop_log_path(
        runtime_paths::default_user_data_dir(),
        DESKTOP_LOG_FILE,
    ));
    logger.startup("desktop process starting");
    logger.startup(&format!("desktop log path: {}", logger.path().display()));
    let config = DesktopConfig::from_env();

    let setup_logger = logger.clone();
    let app = tauri::Builder::default()
        .enable_macos_default_menu(false)
        .plugin(tauri_plugin_single_instance::init(|app_handle, _args, _cwd| {
            window_actions::focus_main_window(app_handle);
        }))
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::desktop_bridge_is_desktop_runtime,
            crate::desktop_bridge_commands::desktop_bridge_get_backend_state,
        ])
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                if let Some(shell) = window.app_handle().try_state::<AppShell>() {
                    shell.on_window_closed(window.label());
                }
            }
        })
        .setup(move |app| {
            let app_handle = app.handle().clone();
            let shell = DesktopShell::new(
                config,
                setup_logger,
                TauriWindowHost::new(app_handle.clone()),
            );
            app.manage(Arc::clone(&shell));

            let signal_shell = Arc::clone(&shell);
            let signal_app_handle = app_handle.clone();
            if let Err(error) = signals::install_termination_handler(move || {
                signal_shell.on_termination_signal();
                signal_app_handle.exit(0);
            }) {
                shell.logger().startup(&error);
            }

            let resource_dir = match app_handle.path().resource_dir() {
                Ok(dir) => Some(dir),
                Err(error) => {
                    shell
                        .logger()
                        .startup(&format!("failed to resolve resource directory: {error}"));
                    None
                }
            };
            let plan =
                launch_plan::resolve_launch_plan(shell.config(), &LaunchContext::detect(resource_dir));
            let _readiness_worker = shell.on_ready(plan);
            Ok(())
        })
        .build(tauri::generate_context!());

    let app = match app {
        Ok(app) => app,
        Err(error) => {
            logger.startup(&format!("error while building tauri application: {error}"));
            std::process::exit(1);
        }
    };

    app.run(|app_handle, event| match event {
        RunEvent::ExitRequested { code, api, .. } => {
            exit_events::handle_exit_requested(app_handle, code, &api);
        }
        RunEvent::Exit => {
            exit_events::handle_exit_event(app_handle);
        }
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => {
            exit_events::handle_reopen(app_handle);
        }
        _ => {}
    });
}
