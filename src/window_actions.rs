use tauri::{AppHandle, Manager};

use paintstore_desktop::app_constants::MAIN_WINDOW_LABEL;

use crate::AppShell;

/// Brings the existing main window forward, e.g. when a second instance of
/// the app is launched.
pub(crate) fn focus_main_window(app_handle: &AppHandle) {
    let Some(shell) = app_handle.try_state::<AppShell>() else {
        return;
    };
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        shell
            .logger()
            .runtime("focus_main_window skipped: main window not found");
        return;
    };

    if let Err(error) = window.unminimize() {
        shell
            .logger()
            .runtime(&format!("failed to unminimize main window: {error}"));
    }
    if let Err(error) = window.show() {
        shell
            .logger()
            .runtime(&format!("failed to show main window: {error}"));
    }
    if let Err(error) = window.set_focus() {
        shell
            .logger()
            .runtime(&format!("failed to focus main window: {error}"));
    }
}
