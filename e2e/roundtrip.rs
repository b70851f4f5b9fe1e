// e2e/roundtrip.rs — pack/unpack round trips through the real tools
//
// Every test here drives the built binary against real tar and zstd and
// early-returns when either tool is missing from PATH.

use std::fs;
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

/// Build a small tree: dir/a.txt, dir/sub/b.bin, and (on Unix) a symlink.
fn make_tree(root: &Path) {
    let dir = root.join("dir");
    fs::create_dir_all(dir.join("sub")).unwrap();
    fs::write(dir.join("a.txt"), "alpha file contents\n".repeat(64)).unwrap();
    fs::write(dir.join("sub").join("b.bin"), vec![0u8, 1, 2, 3, 255, 254]).unwrap();
    #[cfg(unix)]
    std::os::unix::fs::symlink("a.txt", dir.join("link")).unwrap();
}

// ── 1. Full round trip (pack → unpack → byte-for-byte compare) ───────────────

#[test]
fn pack_then_unpack_reproduces_tree() {
    if !have_tools() {
        eprintln!("skipping: tar/zstd not available");
        return;
    }
    let dir = TempDir::new().unwrap();
    make_tree(dir.path());

    let status = Command::new(tzst_bin())
        .args(["-i", "dir", "-q", "3", "-o", "a.tar.zst"])
        .current_dir(dir.path())
        .status()
        .expect("failed to run tzst pack");
    assert!(status.success(), "pack should exit 0");
    assert!(dir.path().join("a.tar.zst").exists());

    let status = Command::new(tzst_bin())
        .args(["-u", "a.tar.zst", "-o", "out"])
        .current_dir(dir.path())
        .status()
        .expect("failed to run tzst unpack");
    assert!(status.success(), "unpack should exit 0");

    let original = dir.path().join("dir");
    let restored = dir.path().join("out").join("dir");
    assert_eq!(
        fs::read(original.join("a.txt")).unwrap(),
        fs::read(restored.join("a.txt")).unwrap()
    );
    assert_eq!(
        fs::read(original.join("sub").join("b.bin")).unwrap(),
        fs::read(restored.join("sub").join("b.bin")).unwrap()
    );
    #[cfg(unix)]
    {
        let target = fs::read_link(restored.join("link")).unwrap();
        assert_eq!(target, PathBuf::from("a.txt"), "symlink target preserved");
    }
}

// ── 2. Default output naming ──────────────────────────────────────────────────

#[test]
fn single_input_default_name() {
    if !have_tools() {
        eprintln!("skipping: tar/zstd not available");
        return;
    }
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("foo.txt"), "contents").unwrap();

    let status = Command::new(tzst_bin())
        .args(["-i", "foo.txt"])
        .current_dir(dir.path())
        .status()
        .expect("failed to run tzst");
    assert!(status.success());
    assert!(dir.path().join("foo.txt.tar.zst").exists());
}

#[test]
fn two_inputs_default_name() {
    if !have_tools() {
        eprintln!("skipping: tar/zstd not available");
        return;
    }
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a"), "a").unwrap();
    fs::write(dir.path().join("b"), "b").unwrap();

    let status = Command::new(tzst_bin())
        .args(["-i", "a", "-i", "b"])
        .current_dir(dir.path())
        .status()
        .expect("failed to run tzst");
    assert!(status.success());
    assert!(dir.path().join("archive.tar.zst").exists());
}

// ── 3. Force overwrite replaces the archive ──────────────────────────────────

#[test]
fn force_overwrite_replaces_archive() {
    if !have_tools() {
        eprintln!("skipping: tar/zstd not available");
        return;
    }
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("in.txt"), "payload").unwrap();
    fs::write(dir.path().join("out.tar.zst"), "stale bytes").unwrap();

    let status = Command::new(tzst_bin())
        .args(["-i", "in.txt", "-o", "out.tar.zst", "-f"])
        .current_dir(dir.path())
        .status()
        .expect("failed to run tzst");
    assert!(status.success(), "forced pack should exit 0");
    let replaced = fs::read(dir.path().join("out.tar.zst")).unwrap();
    assert_ne!(replaced, b"stale bytes");

    // The replacement must be a real archive.
    let status = Command::new(tzst_bin())
        .args(["-u", "out.tar.zst", "-o", "check"])
        .current_dir(dir.path())
        .status()
        .expect("failed to run tzst unpack");
    assert!(status.success());
    assert_eq!(
        fs::read(dir.path().join("check").join("in.txt")).unwrap(),
        b"payload"
    );
}

// ── 4. Level bounds produce valid archives ───────────────────────────────────

#[test]
fn level_bounds_produce_valid_archives() {
    if !have_tools() {
        eprintln!("skipping: tar/zstd not available");
        return;
    }
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("in.txt"), "tiny").unwrap();

    for level in ["1", "22"] {
        let archive = format!("lvl{}.tar.zst", level);
        let status = Command::new(tzst_bin())
            .args(["-i", "in.txt", "-q", level, "-o", &archive])
            .current_dir(dir.path())
            .status()
            .expect("failed to run tzst");
        assert!(status.success(), "level {level} pack should exit 0");

        let out = format!("out{}", level);
        let status = Command::new(tzst_bin())
            .args(["-u", &archive, "-o", &out])
            .current_dir(dir.path())
            .status()
            .expect("failed to run tzst unpack");
        assert!(status.success(), "level {level} archive should unpack");
        assert_eq!(
            fs::read(dir.path().join(&out).join("in.txt")).unwrap(),
            b"tiny"
        );
    }
}

// ── 5. Unpack defaults to the current directory ──────────────────────────────

#[test]
fn unpack_into_cwd_by_default() {
    if !have_tools() {
        eprintln!("skipping: tar/zstd not available");
        return;
    }
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("in.txt"), "cwd test").unwrap();
    let status = Command::new(tzst_bin())
        .args(["-i", "in.txt", "-o", "a.tar.zst"])
        .current_dir(dir.path())
        .status()
        .unwrap();
    assert!(status.success());

    let extract_dir = dir.path().join("elsewhere");
    fs::create_dir(&extract_dir).unwrap();
    let archive = dir.path().join("a.tar.zst");
    let status = Command::new(tzst_bin())
        .args(["-u", archive.to_str().unwrap()])
        .current_dir(&extract_dir)
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(fs::read(extract_dir.join("in.txt")).unwrap(), b"cwd test");
}

// ── 6. Environment default level ──────────────────────────────────────────────

#[test]
fn env_level_applies_when_no_q_given() {
    if !have_tools() {
        eprintln!("skipping: tar/zstd not available");
        return;
    }
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("in.txt"), "env level").unwrap();
    let status = Command::new(tzst_bin())
        .args(["-i", "in.txt", "-o", "a.tar.zst"])
        .env("TZST_CLEVEL", "1")
        .current_dir(dir.path())
        .status()
        .unwrap();
    assert!(status.success(), "TZST_CLEVEL=1 pack should exit 0");
    assert!(dir.path().join("a.tar.zst").exists());
}
