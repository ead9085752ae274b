use tauri::{AppHandle, WebviewUrl, WebviewWindowBuilder};
use url::Url;

use paintstore_desktop::{WindowContent, WindowHost, WindowSpec};

pub(crate) struct TauriWindowHost {
    app_handle: AppHandle,
}

impl TauriWindowHost {
    pub(crate) fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

fn webview_url(content: &WindowContent) -> Result<WebviewUrl, String> {
    match content {
        WindowContent::DevServer(raw) => Url::parse(raw)
            .map(WebviewUrl::External)
            .map_err(|error| format!("Invalid development server URL {raw}: {error}")),
        WindowContent::PackagedAsset(path) => Ok(WebviewUrl::App(path.clone())),
    }
}

impl WindowHost for TauriWindowHost {
    fn create_window(&self, spec: &WindowSpec) -> Result<(), String> {
        let window = WebviewWindowBuilder::new(&self.app_handle, &spec.label, webview_url(&spec.content)?)
            .title(&spec.title)
            .inner_size(spec.width, spec.height)
            .decorations(true)
            .build()
            .map_err(|error| format!("Failed to build window '{}': {error}", spec.label))?;

        if !spec.menu_bar {
            window
                .remove_menu()
                .map_err(|error| format!("Failed to remove menu from '{}': {error}", spec.label))?;
        }
        Ok(())
    }
}
