//! Logger setup plus conditional logging macros gated by a module-level
//! `ENABLE_LOGS` flag.
//!
//! ```rust,ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_info, log_warn, log_error};
//!
//! log_info!("Appended reading for user {user}");
//! ```

use log::LevelFilter;

/// Installs `env_logger`. `RUST_LOG` overrides the default `info` level.
/// Calling it twice is harmless.
pub fn init() {
    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .try_init();
}

/// Logs at `$level` when the calling module sets `ENABLE_LOGS`. The flag
/// resolves at the call site, so each module switches its own output.
#[doc(hidden)]
#[macro_export]
macro_rules! log_gated {
    ($level:expr, $($arg:tt)*) => {
        if ENABLE_LOGS {
            log::log!($level, $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::log_gated!(log::Level::Info, $($arg)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::log_gated!(log::Level::Warn, $($arg)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { $crate::log_gated!(log::Level::Error, $($arg)*) };
}

#[cfg(test)]
mod tests {
    const ENABLE_LOGS: bool = false;

    #[test]
    fn disabled_module_skips_argument_evaluation() {
        let mut evaluated = false;
        log_warn!("{}", {
            evaluated = true;
            "never"
        });
        assert!(!evaluated);
    }
}
