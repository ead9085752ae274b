use std::sync::atomic::{AtomicBool, Ordering};

static HANDLER_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Routes SIGINT/SIGTERM (console close events on Windows) to `on_signal`.
///
/// The process-wide handler can only be installed once; later calls fail
/// without replacing it.
pub fn install_termination_handler<F>(on_signal: F) -> Result<(), String>
where
    F: FnMut() + Send + 'static,
{
    if HANDLER_INSTALLED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return Err("Termination handler is already installed.".to_string());
    }

    ctrlc::set_handler(on_signal).map_err(|error| {
        HANDLER_INSTALLED.store(false, Ordering::Release);
        format!("Failed to install termination handler: {error}")
    })
}
