//! Program identity strings, compression-level bounds, and the shared
//! display-level atomic used by the diagnostic macros.
//!
//! The display level gates everything written to stderr:
//! 0 = silent; 1 = errors only; 2 = normal (errors + warnings); 3+ = verbose.

use std::sync::atomic::{AtomicU32, Ordering};

// ── String / identity constants ───────────────────────────────────────────────
pub const PROGRAM_NAME: &str = "tzst";
pub const ARCHIVER_BIN: &str = "tar";
pub const COMPRESSOR_BIN: &str = "zstd";

/// Extension appended when deriving an archive name from a single input.
pub const ARCHIVE_EXTENSION: &str = ".tar.zst";

/// Archive name used when no better name can be derived.
pub const DEFAULT_ARCHIVE_NAME: &str = "archive.tar.zst";

// ── Compression level bounds ──────────────────────────────────────────────────
/// Lowest compression level accepted for `-q`.
pub const CLEVEL_MIN: u32 = 1;
/// Highest compression level accepted; levels 20-22 require the ultra flag.
pub const CLEVEL_MAX: u32 = 22;
/// Level used when neither `-q` nor `TZST_CLEVEL` is given.
pub const CLEVEL_DEFAULT: u32 = 9;
/// Levels at or above this need `--ultra` on the compressor command line.
pub const ULTRA_THRESHOLD: u32 = 20;

/// Environment variable that overrides [`CLEVEL_DEFAULT`].
pub const ENV_CLEVEL: &str = "TZST_CLEVEL";

// ── Display level global ──────────────────────────────────────────────────────
//
// A crate-level atomic so the macros below can be used from any module
// without threading a verbosity value through every call.
pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(2);

/// Returns the current display level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level.
#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

// ── Display macros ────────────────────────────────────────────────────────────

/// Print a line to stderr when the display level is at or above `level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::cli::constants::display_level() >= $level {
            eprintln!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_constant() {
        assert_eq!(ARCHIVE_EXTENSION, ".tar.zst");
    }

    #[test]
    fn default_archive_name_carries_extension() {
        assert!(DEFAULT_ARCHIVE_NAME.ends_with(ARCHIVE_EXTENSION));
    }

    #[test]
    fn level_bounds() {
        assert!(CLEVEL_MIN <= CLEVEL_DEFAULT);
        assert!(CLEVEL_DEFAULT <= CLEVEL_MAX);
        assert!(ULTRA_THRESHOLD <= CLEVEL_MAX);
    }

    #[test]
    fn display_level_round_trips() {
        let prev = display_level();
        set_display_level(3);
        assert_eq!(display_level(), 3);
        set_display_level(prev);
    }
}
