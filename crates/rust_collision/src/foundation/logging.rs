//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Panics if a global logger has already been installed; use [`try_init`]
/// where initialization may happen more than once (tests, embedding hosts).
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system, ignoring an already-installed logger
pub fn try_init() {
    let _ = env_logger::builder().is_test(cfg!(test)).try_init();
}
