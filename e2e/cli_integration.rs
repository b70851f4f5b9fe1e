// e2e/cli_integration.rs — CLI integration tests
//
// Tests the `tzst` binary as a black-box CLI tool using std::process::Command.
// Covers usage/help paths, resolution errors, exit codes, and the preflight
// failures that need real tools on PATH (those skip when tar/zstd are absent).

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Locate the `tzst` binary produced by Cargo.
fn tzst_bin() -> PathBuf {
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_tzst") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("tzst");
    p
}

/// True when both external tools are reachable; tests that exercise the
/// post-resolution phases early-return otherwise.
fn have_tools() -> bool {
    let probe = |bin: &str| {
        Command::new(bin)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    };
    probe("tar") && probe("zstd")
}

// ── 1. Help paths exit 0 ──────────────────────────────────────────────────────

#[test]
fn no_args_shows_usage_and_exits_zero() {
    let output = Command::new(tzst_bin()).output().expect("failed to run tzst");
    assert!(output.status.success(), "empty invocation must exit 0");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Usage"),
        "usage text expected on stderr; got: {stderr}"
    );
}

#[test]
fn dash_h_shows_usage_and_exits_zero() {
    let output = Command::new(tzst_bin())
        .arg("-h")
        .output()
        .expect("failed to run tzst -h");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"));
}

// ── 2. Resolution errors exit 1 before any filesystem access ─────────────────

#[test]
fn unknown_option_exits_one() {
    let output = Command::new(tzst_bin())
        .arg("-x")
        .output()
        .expect("failed to run tzst");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bad usage"), "got: {stderr}");
}

#[test]
fn positional_argument_exits_one() {
    let output = Command::new(tzst_bin())
        .arg("stray.txt")
        .output()
        .expect("failed to run tzst");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn conflicting_modes_exit_one() {
    let output = Command::new(tzst_bin())
        .args(["-i", "a", "-u", "b.tar.zst"])
        .output()
        .expect("failed to run tzst");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn out_of_range_levels_exit_one_without_output() {
    let dir = TempDir::new().unwrap();
    for bad_level in ["0", "23", "fast"] {
        let output = Command::new(tzst_bin())
            .args(["-i", "in.txt", "-q", bad_level])
            .current_dir(dir.path())
            .output()
            .expect("failed to run tzst");
        assert_eq!(
            output.status.code(),
            Some(1),
            "-q {bad_level} must be rejected"
        );
    }
    // Resolution failed every time; nothing may have been written.
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}

// ── 3. Preflight failures (require tar/zstd on PATH) ─────────────────────────

#[test]
fn missing_input_exits_one_and_names_it() {
    if !have_tools() {
        eprintln!("skipping: tar/zstd not available");
        return;
    }
    let dir = TempDir::new().unwrap();
    let output = Command::new(tzst_bin())
        .args(["-i", "missing.txt"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run tzst");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("missing.txt"),
        "diagnostic must name the missing input; got: {stderr}"
    );
    assert!(
        !dir.path().join("missing.txt.tar.zst").exists(),
        "no output file may be created"
    );
}

#[test]
fn overwrite_protection_leaves_existing_file_untouched() {
    if !have_tools() {
        eprintln!("skipping: tar/zstd not available");
        return;
    }
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("in.txt"), "payload").unwrap();
    fs::write(dir.path().join("out.tar.zst"), "pre-existing bytes").unwrap();

    let output = Command::new(tzst_bin())
        .args(["-i", "in.txt", "-o", "out.tar.zst"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run tzst");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("already exists"), "got: {stderr}");
    assert_eq!(
        fs::read(dir.path().join("out.tar.zst")).unwrap(),
        b"pre-existing bytes"
    );
}

#[test]
fn root_pack_is_refused_even_with_force() {
    if !have_tools() {
        eprintln!("skipping: tar/zstd not available");
        return;
    }
    let dir = TempDir::new().unwrap();
    let output = Command::new(tzst_bin())
        .args(["-i", "/", "-f"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run tzst");
    assert_eq!(output.status.code(), Some(1));
    assert!(
        !dir.path().join("archive.tar.zst").exists(),
        "root guard must fire before any output is written"
    );
}

// ── 4. Non-fatal warnings reach stderr ───────────────────────────────────────

#[test]
fn derived_name_fallback_warns_on_stderr() {
    if !have_tools() {
        eprintln!("skipping: tar/zstd not available");
        return;
    }
    let dir = TempDir::new().unwrap();
    // Pre-existing default-named archive makes the run stop in preflight,
    // after the name-fallback warning has already been printed.
    fs::write(dir.path().join("archive.tar.zst"), "occupied").unwrap();
    let output = Command::new(tzst_bin())
        .args(["-i", "."])
        .current_dir(dir.path())
        .output()
        .expect("failed to run tzst");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("warning: cannot derive an archive name"),
        "fallback warning expected on stderr; got: {stderr}"
    );
    assert!(stderr.contains("already exists"), "got: {stderr}");
}

#[test]
fn unpack_warns_about_ignored_pack_flags() {
    if !have_tools() {
        eprintln!("skipping: tar/zstd not available");
        return;
    }
    let dir = TempDir::new().unwrap();
    let output = Command::new(tzst_bin())
        .args(["-u", "missing.tar.zst", "-f", "-q", "9"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run tzst");
    // The missing archive still fails the run, but only after both
    // ignored-flag warnings were printed.
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("warning: -f only applies to packing"),
        "got: {stderr}"
    );
    assert!(
        stderr.contains("warning: -q 9 only applies to packing"),
        "got: {stderr}"
    );
}

#[test]
fn unpack_target_conflicting_with_file_exits_one() {
    if !have_tools() {
        eprintln!("skipping: tar/zstd not available");
        return;
    }
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.tar.zst"), "not really an archive").unwrap();
    fs::write(dir.path().join("occupied"), "").unwrap();
    let output = Command::new(tzst_bin())
        .args(["-u", "a.tar.zst", "-o", "occupied"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run tzst");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a directory"), "got: {stderr}");
}
