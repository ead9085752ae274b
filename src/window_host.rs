use std::path::PathBuf;

use crate::{
    app_constants::{
        APP_NAME, MAIN_WINDOW_HEIGHT, MAIN_WINDOW_LABEL, MAIN_WINDOW_WIDTH, PACKAGED_INDEX_PAGE,
    },
    startup_mode::DesktopMode,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowContent {
    DevServer(String),
    /// Path relative to the bundled frontend assets.
    PackagedAsset(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub label: String,
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub menu_bar: bool,
    pub content: WindowContent,
}

impl WindowSpec {
    pub fn main_window(mode: DesktopMode, dev_server_url: &str) -> Self {
        let content = match mode {
            DesktopMode::Development => WindowContent::DevServer(dev_server_url.to_string()),
            DesktopMode::Packaged => WindowContent::PackagedAsset(PathBuf::from(PACKAGED_INDEX_PAGE)),
        };
        Self {
            label: MAIN_WINDOW_LABEL.to_string(),
            title: APP_NAME.to_string(),
            width: MAIN_WINDOW_WIDTH,
            height: MAIN_WINDOW_HEIGHT,
            menu_bar: false,
            content,
        }
    }
}

/// GUI side of the shell: something that can put a window on screen.
pub trait WindowHost: Send + Sync + 'static {
    fn create_window(&self, spec: &WindowSpec) -> Result<(), String>;
}
