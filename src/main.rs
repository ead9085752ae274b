#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_runtime;
mod desktop_bridge_commands;
mod exit_events;
mod main_window;
mod window_actions;

pub(crate) type AppShell =
    std::sync::Arc<paintstore_desktop::DesktopShell<main_window::TauriWindowHost>>;

fn main() {
    app_runtime::run();
}
