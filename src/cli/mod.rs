//! Command-line interface for the `tzst` binary.
//!
//! This module organises the front half of the pipeline:
//!
//! | Submodule     | Responsibility |
//! |---------------|---------------|
//! | [`constants`] | Program identity strings, level bounds, and the shared `DISPLAY_LEVEL` atomic. |
//! | [`help`]      | Usage text printer. |
//! | [`arg_utils`] | Low-level helpers: path basename, separator stripping, integer parsing. |
//! | [`args`]      | The resolver — consumes `argv` and produces an immutable `Operation`. |
//!
//! Typical call sequence: `args::resolve` → dependency probe → preflight → pipeline.

pub mod constants;
pub mod help;
pub mod arg_utils;
pub mod args;
