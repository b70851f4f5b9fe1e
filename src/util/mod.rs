//! Filesystem utility helpers shared by the preflight validator and the
//! pipeline executor's rollback path.

pub mod file_status;

// ── Re-exports at `util::` level ─────────────────────────────────────────────

pub use file_status::{is_dir_empty, is_directory, is_readable, is_reg_file, is_writable};
