//! Lightweight, configurable logging for the myquery client crates.
//!
//! Controlled by the MYQUERY_LOG environment variable:
//! - unset or "off" (default) - no logs
//! - "error", "warn", "info", "debug" - minimum level emitted to stderr

use std::sync::Once;

// Re-export emit so the macros can expand outside this crate
pub use emit;

static INIT: Once = Once::new();

/// Initialize diagnostics based on the MYQUERY_LOG environment variable.
///
/// Safe to call more than once; only the first call takes effect.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let level = std::env::var("MYQUERY_LOG").unwrap_or_else(|_| "off".to_string());

        let min_level = match level.as_str() {
            "off" => return,
            "debug" => emit::Level::Debug,
            "info" => emit::Level::Info,
            "warn" => emit::Level::Warn,
            "error" => emit::Level::Error,
            other => {
                eprintln!("Warning: unknown MYQUERY_LOG value '{other}', using 'info'");
                emit::Level::Info
            }
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(min_level))
            .init();

        // The runtime must outlive the process; there is no shutdown hook here.
        std::mem::forget(rt);
    });
}

// The macros render their arguments with std formatting and hand emit the
// finished text as a single property. Rendering first keeps the call site's
// locals visible to `{ident}` templates; forwarding the raw tokens into
// emit's own template capture would hide them behind macro hygiene.

/// Log basic operations users might want to see in normal usage.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!("{text}", text: ::std::format!($($arg)*))
    };
}

/// Log detailed diagnostics useful when debugging query behavior.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!("{text}", text: ::std::format!($($arg)*))
    };
}

/// Log recoverable issues worth noting (fallbacks, odd server output).
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!("{text}", text: ::std::format!($($arg)*))
    };
}

/// Log failures that prevent a query from completing.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!("{text}", text: ::std::format!($($arg)*))
    };
}

pub use init_diagnostics as init;
