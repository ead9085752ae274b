use tauri::{AppHandle, Manager};

use paintstore_desktop::BackendBridgeState;

use crate::AppShell;

#[tauri::command]
pub(crate) fn desktop_bridge_is_desktop_runtime() -> bool {
    true
}

#[tauri::command]
pub(crate) fn desktop_bridge_get_backend_state(app_handle: AppHandle) -> Option<BackendBridgeState> {
    app_handle
        .try_state::<AppShell>()
        .map(|shell| shell.bridge_state())
}
