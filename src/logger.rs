//! Structured logging with visual formatting.
//!
//! Provides the box-drawing log macros used throughout sunswitch. The daemon
//! typically runs unattended under an init system, so output is line-oriented
//! and flushed eagerly; the journal picks it up as-is.
//!
//! Conventions:
//! - `log_version!` prints the startup header once.
//! - `log_block_start!` opens a new conceptual block (config loaded, GPIO
//!   acquired, deadline fired). Related follow-up lines use `log_decorated!`
//!   or `log_indented!`.
//! - `log_pipe!` inserts a single spacer line before a warning/error that is
//!   not itself starting a block.
//! - `log_end!` prints the final termination marker at shutdown.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

/// Main logging interface providing structured output formatting.
pub struct Log;

impl Log {
    /// Enable or disable logging at runtime.
    ///
    /// Used by tests and by quiet operation where log output would
    /// interfere with results.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }
}

/// Write a formatted line to stdout and flush immediately.
pub fn write_output(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let version = env!("CARGO_PKG_VERSION");
            $crate::logger::write_output(&format!("┏ sunswitch v{version} ━━╸\n"));
        }
    }};
}

/// Log a decorated message, typically as part of an existing block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let message = format!($($arg)*);
            $crate::logger::write_output(&format!("┣ {message}\n"));
        }
    }};
}

/// Log an indented message for sub-items or details within a block.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let message = format!($($arg)*);
            $crate::logger::write_output(&format!("┃   {message}\n"));
        }
    }};
}

/// Log a visual pipe separator for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            $crate::logger::write_output("┃\n");
        }
    }};
}

/// Log a block start message, initiating a new conceptual block.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let message = format!($($arg)*);
            $crate::logger::write_output(&format!("┃\n┣ {message}\n"));
        }
    }};
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            $crate::logger::write_output("╹\n");
        }
    }};
}

/// Log a warning message with pipe prefix and yellow-colored level tag.
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let message = format!($($arg)*);
            $crate::logger::write_output(&format!("┣[\x1b[33mWARNING\x1b[0m] {message}\n"));
        }
    }};
}

/// Log an error message with pipe prefix and red-colored level tag.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let message = format!($($arg)*);
            $crate::logger::write_output(&format!("┣[\x1b[31mERROR\x1b[0m] {message}\n"));
        }
    }};
}

/// Log a terminal error with a pipe prefix and corner, indicating flow termination.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let message = format!($($arg)*);
            $crate::logger::write_output(&format!("┃\n┗[\x1b[31mERROR\x1b[0m] {message}\n"));
        }
    }};
}

/// Log a debug/operational message with pipe prefix and green-colored level tag.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let message = format!($($arg)*);
            $crate::logger::write_output(&format!("┣[\x1b[32mDEBUG\x1b[0m] {message}\n"));
        }
    }};
}
