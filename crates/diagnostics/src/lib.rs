//! Logging setup shared by the entryfs workspace
//!
//! Provides lightweight, configurable logging for every crate.
//!
//! Usage:
//! - Set ENTRYFS_LOG=off (default) - no logs
//! - Set ENTRYFS_LOG=info - entry mutations, mounts
//! - Set ENTRYFS_LOG=debug - lookups, lock traffic, node refcounts

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable holding the log level.
pub const LOG_ENV: &str = "ENTRYFS_LOG";

static INIT: Once = Once::new();

fn level_from_str(level: &str) -> Option<Option<emit::Level>> {
    match level {
        "off" => Some(None),
        "debug" => Some(Some(emit::Level::Debug)),
        "info" => Some(Some(emit::Level::Info)),
        "warn" => Some(Some(emit::Level::Warn)),
        "error" => Some(Some(emit::Level::Error)),
        _ => None,
    }
}

/// Initialize diagnostics based on the ENTRYFS_LOG environment variable
///
/// Safe to call multiple times - subsequent calls are ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let log_level = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());

        let (min, unknown) = match level_from_str(&log_level) {
            Some(None) => return,
            Some(Some(level)) => (level, false),
            None => (emit::Level::Info, true),
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(min))
            .init();

        if unknown {
            emit::warn!("unknown {var} value {value}, using info", var: LOG_ENV, value: log_level);
        }

        // The runtime lives for the rest of the process.
        std::mem::forget(rt);
    });
}

/// Log basic operations (mounts, entry creation and removal)
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (lookups, lock categories, refcounts)
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable problems (rollback failures, stale handles)
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that prevent an operation from completing
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;
