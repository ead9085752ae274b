//! Desktop shell for the Paint Store application: supervises the bundled
//! backend server process and hosts the single application window.

pub mod app_constants;
pub mod app_types;
pub mod backend_config;
pub mod backend_http;
pub mod backend_readiness;
pub mod desktop_config;
pub mod desktop_shell;
pub mod http_response;
pub mod launch_plan;
pub mod launcher_script;
pub mod lifecycle_state;
pub mod logging;
pub mod process_control;
pub mod runtime_paths;
pub mod signals;
pub mod startup_mode;
pub mod supervisor;
pub mod window_host;

pub use app_types::{
    BackendBridgeState, BackendStdio, ExitReport, LaunchPlan, StopOutcome, TerminationMethod,
};
pub use desktop_config::DesktopConfig;
pub use desktop_shell::DesktopShell;
pub use logging::DesktopLogger;
pub use supervisor::{ProcessSupervisor, SupervisorError};
pub use window_host::{WindowContent, WindowHost, WindowSpec};
