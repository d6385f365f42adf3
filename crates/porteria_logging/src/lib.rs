#![deny(missing_docs)]
//! Shared logging utilities for the porteria workspace.
//!
//! This crate provides the `porteria_*` logging macros used across the
//! codebase, a helper that keeps student tokens out of log files, and a
//! minimal test initializer for the global logger.

/// Number of leading token characters that may appear in a log line.
const TOKEN_PREFIX_CHARS: usize = 4;

/// Renders a token for logging without leaking the whole credential.
///
/// Produces `len=<n> prefix=<first chars>…`.
pub fn redact_token(token: &str) -> String {
    let prefix: String = token.chars().take(TOKEN_PREFIX_CHARS).collect();
    let len = token.chars().count();
    if len > TOKEN_PREFIX_CHARS {
        format!("len={len} prefix={prefix}…")
    } else {
        format!("len={len}")
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! porteria_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! porteria_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! porteria_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! porteria_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! porteria_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
