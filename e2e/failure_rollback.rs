// e2e/failure_rollback.rs — pipeline failure and rollback behavior
//
// Runs the binary against fake tar/zstd shims placed first on PATH, so the
// failure paths are exercised deterministically and without the real tools.
// Shims are shell scripts; the whole file is Unix-only.

#![cfg(unix)]

use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

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

/// Write an executable shell script shim into `dir`.
fn write_shim(dir: &Path, name: &str, script: &str) {
    let path = dir.join(name);
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// PATH with `shim_dir` prepended so the shims shadow any real tools.
fn shimmed_path(shim_dir: &Path) -> OsString {
    let orig = std::env::var_os("PATH").unwrap_or_default();
    let mut paths = vec![shim_dir.to_path_buf()];
    paths.extend(std::env::split_paths(&orig));
    std::env::join_paths(paths).unwrap()
}

// ── 1. Pack failure removes the partial archive ──────────────────────────────

#[test]
fn failed_pack_removes_partial_output() {
    let dir = TempDir::new().unwrap();
    let shims = dir.path().join("shims");
    fs::create_dir(&shims).unwrap();
    write_shim(&shims, "tar", "#!/bin/sh\nexit 0\n");
    // Mimics a compressor that starts writing its output, then dies.
    write_shim(
        &shims,
        "zstd",
        "#!/bin/sh\nfor last; do :; done\necho partial > \"$last\"\nexit 1\n",
    );

    let work = dir.path().join("work");
    fs::create_dir(&work).unwrap();
    fs::write(work.join("in.txt"), "payload").unwrap();

    let output = Command::new(tzst_bin())
        .args(["-i", "in.txt", "-o", "out.tar.zst"])
        .env("PATH", shimmed_path(&shims))
        .current_dir(&work)
        .output()
        .expect("failed to run tzst");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error occurred during packing"),
        "generic packing diagnostic expected; got: {stderr}"
    );
    assert!(
        !work.join("out.tar.zst").exists(),
        "partial archive must be rolled back"
    );
}

// ── 2. Unpack failure removes a script-created empty target ──────────────────

#[test]
fn failed_unpack_removes_created_empty_target() {
    let dir = TempDir::new().unwrap();
    let shims = dir.path().join("shims");
    fs::create_dir(&shims).unwrap();
    write_shim(&shims, "tar", "#!/bin/sh\nexit 0\n");
    write_shim(&shims, "zstd", "#!/bin/sh\nexit 1\n");

    let work = dir.path().join("work");
    fs::create_dir(&work).unwrap();
    fs::write(work.join("a.tar.zst"), "bytes").unwrap();

    let output = Command::new(tzst_bin())
        .args(["-u", "a.tar.zst", "-o", "fresh"])
        .env("PATH", shimmed_path(&shims))
        .current_dir(&work)
        .output()
        .expect("failed to run tzst");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error occurred during unpacking"),
        "generic unpacking diagnostic expected; got: {stderr}"
    );
    assert!(
        !work.join("fresh").exists(),
        "empty script-created target must be removed"
    );
}

// ── 3. Pre-existing target survives a failed unpack ──────────────────────────

#[test]
fn failed_unpack_preserves_preexisting_target() {
    let dir = TempDir::new().unwrap();
    let shims = dir.path().join("shims");
    fs::create_dir(&shims).unwrap();
    write_shim(&shims, "tar", "#!/bin/sh\nexit 0\n");
    write_shim(&shims, "zstd", "#!/bin/sh\nexit 1\n");

    let work = dir.path().join("work");
    fs::create_dir(&work).unwrap();
    fs::write(work.join("a.tar.zst"), "bytes").unwrap();
    let target = work.join("existing");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("keep.txt"), "precious").unwrap();

    let output = Command::new(tzst_bin())
        .args(["-u", "a.tar.zst", "-o", "existing"])
        .env("PATH", shimmed_path(&shims))
        .current_dir(&work)
        .output()
        .expect("failed to run tzst");

    assert_eq!(output.status.code(), Some(1));
    assert!(target.is_dir(), "pre-existing target must not be removed");
    assert_eq!(fs::read(target.join("keep.txt")).unwrap(), b"precious");
}

// ── 4. Partially filled script-created target is left intact ─────────────────

#[test]
fn failed_unpack_keeps_nonempty_created_target() {
    let dir = TempDir::new().unwrap();
    let shims = dir.path().join("shims");
    fs::create_dir(&shims).unwrap();
    // tar is invoked as `tar -xf - -C <target>`; $4 is the target directory.
    write_shim(&shims, "tar", "#!/bin/sh\ntouch \"$4/leftover\"\nexit 0\n");
    write_shim(&shims, "zstd", "#!/bin/sh\nexit 1\n");

    let work = dir.path().join("work");
    fs::create_dir(&work).unwrap();
    fs::write(work.join("a.tar.zst"), "bytes").unwrap();

    let output = Command::new(tzst_bin())
        .args(["-u", "a.tar.zst", "-o", "fresh"])
        .env("PATH", shimmed_path(&shims))
        .current_dir(&work)
        .output()
        .expect("failed to run tzst");

    assert_eq!(output.status.code(), Some(1));
    let fresh = work.join("fresh");
    assert!(fresh.is_dir(), "non-empty created target must be kept");
    assert!(fresh.join("leftover").exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("leaving partially extracted"),
        "warning about leftover files expected; got: {stderr}"
    );
}

// ── 5. Missing archiver is fatal before anything runs ────────────────────────

#[test]
fn missing_archiver_is_fatal() {
    let dir = TempDir::new().unwrap();
    // Empty PATH: neither tar nor zstd resolve.
    let work = dir.path().join("work");
    fs::create_dir(&work).unwrap();
    fs::write(work.join("in.txt"), "x").unwrap();

    let output = Command::new(tzst_bin())
        .args(["-i", "in.txt"])
        .env("PATH", dir.path().join("shims")) // nonexistent dir
        .current_dir(&work)
        .output()
        .expect("failed to run tzst");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("tar"), "diagnostic must name tar; got: {stderr}");
    assert!(!work.join("in.txt.tar.zst").exists());
}
