//! Scoped, switchable logging macros.
//!
//! Every module that logs defines two constants and then uses the macros,
//! which are exported at the crate root:
//! ```rust,ignore
//! const ENABLE_LOGS: bool = true;
//! const LOG_SCOPE: &str = "reconstruct";
//!
//! use crate::{log_info, log_warn, log_error};
//!
//! log_info!("swept {} steps", 4); // [codeassist :: reconstruct] swept 4 steps
//! ```

/// Info line prefixed with the calling module's `LOG_SCOPE`.
/// Silent when the module's `ENABLE_LOGS` is false.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!("[codeassist :: {}] {}", LOG_SCOPE, format_args!($($arg)*));
        }
    };
}

/// Warn line prefixed with the calling module's `LOG_SCOPE`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!("[codeassist :: {}] {}", LOG_SCOPE, format_args!($($arg)*));
        }
    };
}

/// Error line prefixed with the calling module's `LOG_SCOPE`.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!("[codeassist :: {}] {}", LOG_SCOPE, format_args!($($arg)*));
        }
    };
}

/// Initialize `env_logger` (reads `RUST_LOG`, defaults to info).
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

/// Truncate to at most `max_chars` characters for log previews.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
