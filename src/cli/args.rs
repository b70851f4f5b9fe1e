//! Command-line argument resolution for the `tzst` binary.
//!
//! The entry points are [`resolve`] (reads `std::env::args()` and the
//! `TZST_CLEVEL` environment variable) and [`resolve_from`] (takes an
//! explicit slice and default level, suitable for unit-testing).  Both
//! return a [`Resolution`] value: either `Help` (usage was printed, the
//! caller should exit 0) or `Run` carrying a fully resolved, immutable
//! [`Operation`].
//!
//! All conflicting or malformed input is rejected here, before any
//! filesystem access takes place.  Bad or unrecognised options return an
//! `Err` with a message that begins with `"bad usage: "`, after printing
//! the usage text.

use std::path::PathBuf;

use anyhow::anyhow;

use crate::cli::arg_utils::{last_name_from_path, read_u32_from_str, strip_one_trailing_separator};
use crate::cli::constants::{
    display_level, set_display_level, ARCHIVE_EXTENSION, CLEVEL_DEFAULT, CLEVEL_MAX, CLEVEL_MIN,
    DEFAULT_ARCHIVE_NAME, ENV_CLEVEL,
};
use crate::cli::help::print_usage;
use crate::displaylevel;

// ── Public output types ───────────────────────────────────────────────────────

/// A pack invocation, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackRequest {
    /// Input paths in declaration order; duplicates are allowed and the
    /// order is preserved on the archiver command line.
    pub inputs: Vec<PathBuf>,
    /// Final archive path (explicit `-o`, derived, or the default name).
    pub output_path: PathBuf,
    /// Compression level in `[CLEVEL_MIN, CLEVEL_MAX]`.
    pub level: u32,
    /// Overwrite an existing archive without complaint.
    pub force_overwrite: bool,
}

/// An unpack invocation, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackRequest {
    /// Archive to read.
    pub archive_path: PathBuf,
    /// Destination directory (defaults to the current working directory).
    pub target_dir: PathBuf,
}

/// The resolved intent of a single invocation.
///
/// Constructed exactly once here, consumed read-only by the preflight
/// validator and the pipeline executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Pack(PackRequest),
    Unpack(UnpackRequest),
}

/// Outcome of argument resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Usage was printed (`-h`, or no arguments at all); exit 0.
    Help,
    /// A validated operation to run.
    Run(Operation),
}

// ── Environment default ───────────────────────────────────────────────────────

/// Read the default compression level from the `TZST_CLEVEL` environment
/// variable; an explicit `-q` always takes precedence.
pub fn init_c_level() -> u32 {
    init_c_level_from(std::env::var(ENV_CLEVEL).ok().as_deref())
}

/// Testable core of [`init_c_level`]: parse an optional `TZST_CLEVEL` value.
///
/// Out-of-range or non-numeric values warn and fall back to
/// [`CLEVEL_DEFAULT`]; they never abort the invocation.
pub fn init_c_level_from(env_val: Option<&str>) -> u32 {
    if let Some(env) = env_val {
        if let Some((val, rest)) = read_u32_from_str(env) {
            if rest.is_empty() && (CLEVEL_MIN..=CLEVEL_MAX).contains(&val) {
                return val;
            }
        }
        displaylevel!(
            2,
            "warning: ignoring {}={}: not an integer in [{},{}]",
            ENV_CLEVEL,
            env,
            CLEVEL_MIN,
            CLEVEL_MAX
        );
    }
    CLEVEL_DEFAULT
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Resolve `std::env::args()` (skipping argv[0]) into a [`Resolution`].
pub fn resolve(program: &str) -> anyhow::Result<Resolution> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    resolve_from(program, &argv, init_c_level)
}

/// Resolve an explicit argument list.
///
/// `program` is the executable name (used for usage text), `argv` is
/// argv[1..], and `default_level` supplies the level applied when `-q` is
/// absent.  It is consulted only while folding a pack operation, so help
/// and unpack invocations never read `TZST_CLEVEL` (and never print its
/// ignoring-bad-value warning).  This variant is callable from tests
/// without touching `std::env`.
pub fn resolve_from(
    program: &str,
    argv: &[String],
    default_level: impl FnOnce() -> u32,
) -> anyhow::Result<Resolution> {
    // No arguments at all: show usage and succeed.  Distinct from a usage
    // error — an empty invocation is a request for help, not a mistake.
    if argv.is_empty() {
        print_usage(program);
        return Ok(Resolution::Help);
    }

    // --- Accumulated parsing state; folded into an Operation at the end ---
    #[derive(PartialEq)]
    enum Mode {
        Unset,
        Pack,
        Unpack,
    }
    let mut mode = Mode::Unset;
    let mut inputs: Vec<String> = Vec::new();
    let mut archive: Option<String> = None;
    let mut output_override: Option<String> = None;
    let mut level: Option<u32> = None;
    let mut force_overwrite = false;

    let mut arg_idx = 0usize;
    while arg_idx < argv.len() {
        let argument = argv[arg_idx].as_str();

        match argument {
            "-i" => {
                if mode == Mode::Unpack {
                    return Err(bad_usage(program, "-i cannot be combined with -u"));
                }
                let value = take_value(program, argv, &mut arg_idx, "-i")?;
                mode = Mode::Pack;
                inputs.push(value);
            }
            "-u" => {
                if mode == Mode::Pack {
                    return Err(bad_usage(program, "-u cannot be combined with -i"));
                }
                if archive.is_some() {
                    return Err(bad_usage(program, "-u may only be given once"));
                }
                let value = take_value(program, argv, &mut arg_idx, "-u")?;
                mode = Mode::Unpack;
                archive = Some(value);
            }
            "-o" => {
                if output_override.is_some() {
                    return Err(bad_usage(program, "-o may only be given once"));
                }
                let value = take_value(program, argv, &mut arg_idx, "-o")?;
                output_override = Some(value);
            }
            "-q" => {
                let value = take_value(program, argv, &mut arg_idx, "-q")?;
                let parsed = match read_u32_from_str(&value) {
                    Some((val, "")) => val,
                    _ => {
                        return Err(bad_usage(
                            program,
                            &format!("-q expects an integer, got '{}'", value),
                        ));
                    }
                };
                if !(CLEVEL_MIN..=CLEVEL_MAX).contains(&parsed) {
                    return Err(bad_usage(
                        program,
                        &format!(
                            "compression level must be between {} and {} (got {})",
                            CLEVEL_MIN, CLEVEL_MAX, parsed
                        ),
                    ));
                }
                // A repeated -q must agree with the earlier one; silently
                // letting the last occurrence win hides typos in scripts.
                match level {
                    Some(prev) if prev != parsed => {
                        return Err(bad_usage(
                            program,
                            &format!("-q given twice with different values ({} and {})", prev, parsed),
                        ));
                    }
                    _ => level = Some(parsed),
                }
            }
            "-f" => {
                force_overwrite = true;
            }
            "-v" => {
                set_display_level(display_level().saturating_add(1));
            }
            "-h" => {
                print_usage(program);
                return Ok(Resolution::Help);
            }
            _ => {
                if argument.starts_with('-') {
                    return Err(bad_usage(
                        program,
                        &format!("unrecognised option: {}", argument),
                    ));
                }
                // Inputs must always be named via -i; stray positionals are
                // most likely a forgotten flag.
                return Err(bad_usage(
                    program,
                    &format!("unexpected argument: {} (inputs are given with -i)", argument),
                ));
            }
        }

        arg_idx += 1;
    }

    // ── Fold the accumulated state into an immutable Operation ──────────────

    match mode {
        Mode::Unset => Err(bad_usage(program, "no operation selected (use -i or -u)")),
        Mode::Pack => {
            let output = resolve_pack_output(&inputs, output_override);
            if output.ends_with('/') || output.ends_with('\\') {
                return Err(bad_usage(
                    program,
                    &format!("archive path must name a file, not a directory: {}", output),
                ));
            }
            if std::path::Path::new(&output).is_dir() {
                return Err(bad_usage(
                    program,
                    &format!("archive path is an existing directory: {}", output),
                ));
            }
            Ok(Resolution::Run(Operation::Pack(PackRequest {
                inputs: inputs.into_iter().map(PathBuf::from).collect(),
                output_path: PathBuf::from(output),
                level: level.unwrap_or_else(default_level),
                force_overwrite,
            })))
        }
        Mode::Unpack => {
            // Pack-only options are ignored with a warning, never an error.
            if let Some(lvl) = level {
                displaylevel!(2, "warning: -q {} only applies to packing; ignored", lvl);
            }
            if force_overwrite {
                displaylevel!(2, "warning: -f only applies to packing; ignored");
            }
            let archive = archive.expect("Mode::Unpack implies -u was seen");
            let target = output_override.unwrap_or_else(|| ".".to_owned());
            Ok(Resolution::Run(Operation::Unpack(UnpackRequest {
                archive_path: PathBuf::from(archive),
                target_dir: PathBuf::from(target),
            })))
        }
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Print usage and build a `"bad usage: ..."` error.
fn bad_usage(program: &str, msg: &str) -> anyhow::Error {
    print_usage(program);
    anyhow!("bad usage: {}", msg)
}

/// Consume the value following an option, advancing `arg_idx` past it.
fn take_value(
    program: &str,
    argv: &[String],
    arg_idx: &mut usize,
    option: &str,
) -> anyhow::Result<String> {
    *arg_idx += 1;
    match argv.get(*arg_idx) {
        Some(value) => Ok(value.clone()),
        None => Err(bad_usage(
            program,
            &format!("{} requires an argument", option),
        )),
    }
}

/// Derive the pack output name (explicit `-o` first, then single-input
/// basename, then the default archive name).
fn resolve_pack_output(inputs: &[String], output_override: Option<String>) -> String {
    if let Some(output) = output_override {
        return output;
    }
    if inputs.len() == 1 {
        let stripped = strip_one_trailing_separator(&inputs[0]);
        let base = last_name_from_path(stripped);
        if base.is_empty() || base == "." {
            displaylevel!(
                2,
                "warning: cannot derive an archive name from '{}', using {}",
                inputs[0],
                DEFAULT_ARCHIVE_NAME
            );
            return DEFAULT_ARCHIVE_NAME.to_owned();
        }
        return format!("{}{}", base, ARCHIVE_EXTENSION);
    }
    DEFAULT_ARCHIVE_NAME.to_owned()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn resolve_ok(args: &[&str]) -> Resolution {
        resolve_from("tzst", &make_args(args), || CLEVEL_DEFAULT).expect("resolution failed")
    }

    fn resolve_err(args: &[&str]) -> anyhow::Error {
        resolve_from("tzst", &make_args(args), || CLEVEL_DEFAULT).expect_err("expected error")
    }

    fn pack(args: &[&str]) -> PackRequest {
        match resolve_ok(args) {
            Resolution::Run(Operation::Pack(p)) => p,
            other => panic!("expected pack, got {:?}", other),
        }
    }

    fn unpack(args: &[&str]) -> UnpackRequest {
        match resolve_ok(args) {
            Resolution::Run(Operation::Unpack(u)) => u,
            other => panic!("expected unpack, got {:?}", other),
        }
    }

    // ── Help paths ───────────────────────────────────────────────────────────

    #[test]
    fn no_args_is_help() {
        assert_eq!(resolve_ok(&[]), Resolution::Help);
    }

    #[test]
    fn dash_h_is_help() {
        assert_eq!(resolve_ok(&["-h"]), Resolution::Help);
    }

    #[test]
    fn dash_h_short_circuits_bad_input() {
        // -h wins even when followed by garbage.
        assert_eq!(resolve_ok(&["-h", "--nonsense"]), Resolution::Help);
    }

    // ── Pack basics ──────────────────────────────────────────────────────────

    #[test]
    fn single_input_derives_output_name() {
        let p = pack(&["-i", "foo.txt"]);
        assert_eq!(p.inputs, vec![PathBuf::from("foo.txt")]);
        assert_eq!(p.output_path, PathBuf::from("foo.txt.tar.zst"));
        assert_eq!(p.level, CLEVEL_DEFAULT);
        assert!(!p.force_overwrite);
    }

    #[test]
    fn trailing_separator_stripped_before_derivation() {
        let p = pack(&["-i", "some/dir/"]);
        assert_eq!(p.output_path, PathBuf::from("dir.tar.zst"));
    }

    #[test]
    fn multiple_inputs_use_default_name() {
        let p = pack(&["-i", "a", "-i", "b"]);
        assert_eq!(p.inputs.len(), 2);
        assert_eq!(p.output_path, PathBuf::from(DEFAULT_ARCHIVE_NAME));
    }

    #[test]
    fn duplicate_inputs_preserved_in_order() {
        let p = pack(&["-i", "a", "-i", "a", "-i", "b"]);
        assert_eq!(
            p.inputs,
            vec![PathBuf::from("a"), PathBuf::from("a"), PathBuf::from("b")]
        );
    }

    #[test]
    fn explicit_output_used_verbatim() {
        let p = pack(&["-i", "a", "-i", "b", "-o", "bundle.tar.zst"]);
        assert_eq!(p.output_path, PathBuf::from("bundle.tar.zst"));
    }

    #[test]
    fn dot_input_falls_back_to_default_name() {
        let p = pack(&["-i", "."]);
        assert_eq!(p.output_path, PathBuf::from(DEFAULT_ARCHIVE_NAME));
    }

    #[test]
    fn root_input_falls_back_to_default_name() {
        // Name resolution alone cannot reject "/" — the preflight root guard
        // does that later.  It must still produce the fallback name.
        let p = pack(&["-i", "/"]);
        assert_eq!(p.output_path, PathBuf::from(DEFAULT_ARCHIVE_NAME));
    }

    #[test]
    fn force_flag() {
        let p = pack(&["-i", "a", "-f"]);
        assert!(p.force_overwrite);
    }

    // ── Compression level ────────────────────────────────────────────────────

    #[test]
    fn explicit_level() {
        let p = pack(&["-i", "a", "-q", "19"]);
        assert_eq!(p.level, 19);
    }

    #[test]
    fn level_bounds_accepted() {
        assert_eq!(pack(&["-i", "a", "-q", "1"]).level, 1);
        assert_eq!(pack(&["-i", "a", "-q", "22"]).level, 22);
    }

    #[test]
    fn level_zero_rejected() {
        let e = resolve_err(&["-i", "a", "-q", "0"]);
        assert!(e.to_string().contains("between 1 and 22"));
    }

    #[test]
    fn level_23_rejected() {
        let e = resolve_err(&["-i", "a", "-q", "23"]);
        assert!(e.to_string().contains("between 1 and 22"));
    }

    #[test]
    fn level_non_numeric_rejected() {
        let e = resolve_err(&["-i", "a", "-q", "fast"]);
        assert!(e.to_string().contains("bad usage"));
    }

    #[test]
    fn level_trailing_garbage_rejected() {
        let e = resolve_err(&["-i", "a", "-q", "9x"]);
        assert!(e.to_string().contains("bad usage"));
    }

    #[test]
    fn repeated_level_same_value_accepted() {
        let p = pack(&["-i", "a", "-q", "9", "-q", "9"]);
        assert_eq!(p.level, 9);
    }

    #[test]
    fn repeated_level_different_value_rejected() {
        let e = resolve_err(&["-i", "a", "-q", "9", "-q", "10"]);
        assert!(e.to_string().contains("different values"));
    }

    #[test]
    fn level_overflowing_u32_rejected() {
        // 2^32 + 1 must not wrap into the accepted range.
        let e = resolve_err(&["-i", "a", "-q", "4294967297"]);
        assert!(e.to_string().contains("bad usage"), "got: {e}");
    }

    #[test]
    fn default_level_from_env_value() {
        let p = resolve_from("tzst", &make_args(&["-i", "a"]), || 15).unwrap();
        match p {
            Resolution::Run(Operation::Pack(p)) => assert_eq!(p.level, 15),
            other => panic!("expected pack, got {:?}", other),
        }
    }

    #[test]
    fn explicit_level_beats_env_default() {
        let p = resolve_from("tzst", &make_args(&["-i", "a", "-q", "3"]), || 15).unwrap();
        match p {
            Resolution::Run(Operation::Pack(p)) => assert_eq!(p.level, 3),
            other => panic!("expected pack, got {:?}", other),
        }
    }

    #[test]
    fn help_path_never_reads_default_level() {
        let r = resolve_from("tzst", &make_args(&["-h"]), || {
            panic!("default level read on a help path")
        })
        .unwrap();
        assert_eq!(r, Resolution::Help);
    }

    #[test]
    fn unpack_never_reads_default_level() {
        let r = resolve_from("tzst", &make_args(&["-u", "a.tar.zst"]), || {
            panic!("default level read on an unpack path")
        })
        .unwrap();
        assert!(matches!(r, Resolution::Run(Operation::Unpack(_))));
    }

    // ── init_c_level_from ────────────────────────────────────────────────────

    #[test]
    fn env_level_numeric() {
        assert_eq!(init_c_level_from(Some("15")), 15);
    }

    #[test]
    fn env_level_unset_returns_default() {
        assert_eq!(init_c_level_from(None), CLEVEL_DEFAULT);
    }

    #[test]
    fn env_level_junk_returns_default() {
        assert_eq!(init_c_level_from(Some("junk")), CLEVEL_DEFAULT);
    }

    #[test]
    fn env_level_out_of_range_returns_default() {
        assert_eq!(init_c_level_from(Some("40")), CLEVEL_DEFAULT);
    }

    #[test]
    fn env_level_overflowing_u32_returns_default() {
        assert_eq!(init_c_level_from(Some("4294967297")), CLEVEL_DEFAULT);
    }

    // ── Unpack basics ────────────────────────────────────────────────────────

    #[test]
    fn unpack_defaults_to_cwd() {
        let u = unpack(&["-u", "a.tar.zst"]);
        assert_eq!(u.archive_path, PathBuf::from("a.tar.zst"));
        assert_eq!(u.target_dir, PathBuf::from("."));
    }

    #[test]
    fn unpack_with_target() {
        let u = unpack(&["-u", "a.tar.zst", "-o", "out"]);
        assert_eq!(u.target_dir, PathBuf::from("out"));
    }

    #[test]
    fn unpack_ignores_level_with_warning() {
        // Non-fatal: resolution still succeeds.
        let u = unpack(&["-u", "a.tar.zst", "-q", "9"]);
        assert_eq!(u.archive_path, PathBuf::from("a.tar.zst"));
    }

    #[test]
    fn unpack_ignores_force_with_warning() {
        let u = unpack(&["-u", "a.tar.zst", "-f"]);
        assert_eq!(u.archive_path, PathBuf::from("a.tar.zst"));
    }

    // ── Conflicts and misuse ─────────────────────────────────────────────────

    #[test]
    fn pack_then_unpack_conflicts() {
        let e = resolve_err(&["-i", "a", "-u", "x.tar.zst"]);
        assert!(e.to_string().contains("cannot be combined"));
    }

    #[test]
    fn unpack_then_pack_conflicts() {
        let e = resolve_err(&["-u", "x.tar.zst", "-i", "a"]);
        assert!(e.to_string().contains("cannot be combined"));
    }

    #[test]
    fn second_u_rejected() {
        let e = resolve_err(&["-u", "a.tar.zst", "-u", "b.tar.zst"]);
        assert!(e.to_string().contains("once"));
    }

    #[test]
    fn second_o_rejected() {
        let e = resolve_err(&["-i", "a", "-o", "x", "-o", "y"]);
        assert!(e.to_string().contains("once"));
    }

    #[test]
    fn missing_i_argument_rejected() {
        let e = resolve_err(&["-i"]);
        assert!(e.to_string().contains("requires an argument"));
    }

    #[test]
    fn unknown_option_rejected() {
        let e = resolve_err(&["-x"]);
        assert!(e.to_string().contains("unrecognised option"));
    }

    #[test]
    fn positional_argument_rejected() {
        let e = resolve_err(&["foo.txt"]);
        assert!(e.to_string().contains("unexpected argument"));
    }

    #[test]
    fn flags_without_mode_rejected() {
        let e = resolve_err(&["-f"]);
        assert!(e.to_string().contains("no operation selected"));
    }

    #[test]
    fn output_with_trailing_separator_rejected() {
        let e = resolve_err(&["-i", "a", "-o", "out/"]);
        assert!(e.to_string().contains("not a directory"));
    }
}
