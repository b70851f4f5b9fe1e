// tzst — create and extract .tar.zst archives by driving tar and zstd.

pub mod cli;
pub mod deps;
pub mod preflight;
pub mod pipeline;
pub mod util;

/// Crate version, surfaced for diagnostics.
pub const TZST_VERSION_STRING: &str = env!("CARGO_PKG_VERSION");
