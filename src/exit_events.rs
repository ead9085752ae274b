use tauri::{AppHandle, ExitRequestApi, Manager};

use crate::AppShell;

/// `code` is `None` when the last window closed; explicit exits carry a code
/// and are cleaned up by [`handle_exit_event`].
pub(crate) fn handle_exit_requested(app_handle: &AppHandle, code: Option<i32>, api: &ExitRequestApi) {
    if code.is_some() {
        return;
    }
    let Some(shell) = app_handle.try_state::<AppShell>() else {
        return;
    };

    if !shell.on_window_all_closed() {
        api.prevent_exit();
    }
}

pub(crate) fn handle_exit_event(app_handle: &AppHandle) {
    let Some(shell) = app_handle.try_state::<AppShell>() else {
        return;
    };
    shell.shutdown("application exit");
    shell.logger().shutdown("desktop process exiting");
}

#[cfg(target_os = "macos")]
pub(crate) fn handle_reopen(app_handle: &AppHandle) {
    if let Some(shell) = app_handle.try_state::<AppShell>() {
        shell.on_activate();
    }
}
