//! Centralized logging module for proxysite
//!
//! Diagnostic logs carry the [proxysite] prefix and go through tracing.
//! Messages meant for the person at the terminal (prompts, ✓/✗ lines) are
//! printed directly and do not use these macros.

/// Log an info message with [proxysite] prefix
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        tracing::info!("[proxysite] {}", format!($($arg)*))
    };
}

/// Log a warning message with [proxysite] prefix
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        tracing::warn!("[proxysite] {}", format!($($arg)*))
    };
}

/// Log an error message with [proxysite] prefix
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!("[proxysite] {}", format!($($arg)*))
    };
}

/// Log a debug message with [proxysite] prefix
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        tracing::debug!("[proxysite] {}", format!($($arg)*))
    };
}

/// Initialize the tracing subscriber with default settings.
///
/// Logs are written to stderr so a dry run can pipe the rendered site
/// from stdout straight into a file.
pub fn init() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
