//! Usage text printer.

use crate::cli::constants::{
    ARCHIVE_EXTENSION, CLEVEL_DEFAULT, CLEVEL_MAX, CLEVEL_MIN, DEFAULT_ARCHIVE_NAME,
};

/// Print brief usage to stderr.
pub fn print_usage(program: &str) {
    eprintln!("Usage : ");
    eprintln!("      {} -i <path> [-i <path> ...] [-o <archive>] [-q <level>] [-f]", program);
    eprintln!("      {} -u <archive> [-o <directory>]", program);
    eprintln!();
    eprintln!("Arguments : ");
    eprintln!(" -i PATH : add PATH to the archive; may be repeated (pack mode) ");
    eprintln!(" -u FILE : extract FILE (unpack mode) ");
    eprintln!(" -o PATH : output archive (pack) or target directory (unpack) ");
    eprintln!(
        " -q N    : compression level {}-{} (default:{}) ",
        CLEVEL_MIN, CLEVEL_MAX, CLEVEL_DEFAULT
    );
    eprintln!(" -f      : overwrite an existing archive without complaint ");
    eprintln!(" -v      : verbose mode ");
    eprintln!(" -h      : display this help and exit ");
    eprintln!();
    eprintln!(
        "With a single input and no -o, the archive is named <input>{} ;",
        ARCHIVE_EXTENSION
    );
    eprintln!(
        "with several inputs it is named {} .",
        DEFAULT_ARCHIVE_NAME
    );
    eprintln!("With no -o, unpacking extracts into the current directory.");
}
