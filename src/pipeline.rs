//! Two-stage external pipeline execution with rollback on failure.
//!
//! Packing runs `tar -cf - <inputs> | zstd <opts> -o <archive>`; unpacking
//! runs `zstd -d -c <archive> | tar -xf - -C <target>`.  The pipe itself is
//! scheduled by the operating system; this module only spawns the two
//! children, wires stdout to stdin, and observes both exit statuses.
//!
//! Success requires both stages to exit zero (pipefail semantics).  A pipe's
//! combined status cannot reliably attribute a failure to one stage, so both
//! failure paths report a single generic diagnostic.  Cleanup of partial
//! artifacts is best-effort: a failed removal downgrades to a warning and
//! never changes the already-failed outcome.

use std::fs;
use std::process::{Child, Command, Stdio};

use anyhow::{anyhow, bail, Context};

use crate::cli::args::{PackRequest, UnpackRequest};
use crate::cli::constants::{ARCHIVER_BIN, COMPRESSOR_BIN, ULTRA_THRESHOLD};
use crate::displaylevel;
use crate::preflight::UnpackPlan;
use crate::util::is_dir_empty;

/// Build the compressor's option list for packing: multi-threaded mode, the
/// numeric level, `-f` mirroring the user's force flag, and `--ultra` for
/// levels that zstd refuses without it.
pub fn compressor_args(level: u32, force_overwrite: bool) -> Vec<String> {
    let mut args = vec!["-T0".to_owned(), format!("-{}", level)];
    if force_overwrite {
        args.push("-f".to_owned());
    }
    if level >= ULTRA_THRESHOLD {
        args.push("--ultra".to_owned());
    }
    args
}

/// Run the pack pipeline.  On failure any partially written archive is
/// removed before the error is reported.
pub fn execute_pack(req: &PackRequest) -> anyhow::Result<()> {
    let mut archiver = Command::new(ARCHIVER_BIN)
        .arg("-cf")
        .arg("-")
        // Literal paths as the user gave them, not canonicalized: the
        // archive must store the relative names the user asked for.
        .args(&req.inputs)
        .stdout(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to start {}", ARCHIVER_BIN))?;

    let archive_stream = archiver
        .stdout
        .take()
        .ok_or_else(|| anyhow!("{} stdout was not captured", ARCHIVER_BIN))?;

    let compressor = Command::new(COMPRESSOR_BIN)
        .args(compressor_args(req.level, req.force_overwrite))
        .arg("-o")
        .arg(&req.output_path)
        .stdin(Stdio::from(archive_stream))
        .spawn()
        .with_context(|| format!("failed to start {}", COMPRESSOR_BIN));

    let compressor = match compressor {
        Ok(child) => child,
        Err(e) => {
            // The archiver is already running against a dead pipe; reap it
            // before surfacing the spawn failure.
            let _ = archiver.kill();
            let _ = archiver.wait();
            return Err(e);
        }
    };

    if wait_both(archiver, compressor)? {
        return Ok(());
    }

    if req.output_path.exists() {
        if let Err(e) = fs::remove_file(&req.output_path) {
            displaylevel!(
                2,
                "warning: could not remove partial archive {}: {}",
                req.output_path.display(),
                e
            );
        }
    }
    bail!("error occurred during packing");
}

/// Run the unpack pipeline.  On failure a target directory created during
/// preflight is removed again, but only while it is still empty; a partial
/// extraction is left in place with a warning.
pub fn execute_unpack(req: &UnpackRequest, plan: &UnpackPlan) -> anyhow::Result<()> {
    let mut decompressor = Command::new(COMPRESSOR_BIN)
        .arg("-d")
        .arg("-c")
        .arg(&req.archive_path)
        .stdout(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to start {}", COMPRESSOR_BIN))?;

    let raw_stream = decompressor
        .stdout
        .take()
        .ok_or_else(|| anyhow!("{} stdout was not captured", COMPRESSOR_BIN))?;

    // -C gives tar the explicit extraction directory; entry-path safety
    // (absolute names, ".." escapes) is tar's own guarantee.
    let archiver = Command::new(ARCHIVER_BIN)
        .arg("-xf")
        .arg("-")
        .arg("-C")
        .arg(&req.target_dir)
        .stdin(Stdio::from(raw_stream))
        .spawn()
        .with_context(|| format!("failed to start {}", ARCHIVER_BIN));

    let archiver = match archiver {
        Ok(child) => child,
        Err(e) => {
            let _ = decompressor.kill();
            let _ = decompressor.wait();
            rollback_target(req, plan);
            return Err(e);
        }
    };

    if wait_both(decompressor, archiver)? {
        return Ok(());
    }

    rollback_target(req, plan);
    bail!("error occurred during unpacking");
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Wait for both pipeline stages; `true` only when both exited zero.
fn wait_both(mut first: Child, mut second: Child) -> anyhow::Result<bool> {
    // The downstream stage finishes last; reaping it first avoids holding a
    // zombie while the upstream drains.
    let second_status = second.wait().context("waiting for pipeline stage")?;
    let first_status = first.wait().context("waiting for pipeline stage")?;
    Ok(first_status.success() && second_status.success())
}

/// Remove a preflight-created target directory if it is still empty.
fn rollback_target(req: &UnpackRequest, plan: &UnpackPlan) {
    if !plan.target_created {
        return;
    }
    if is_dir_empty(&req.target_dir) {
        if let Err(e) = fs::remove_dir(&req.target_dir) {
            displaylevel!(
                2,
                "warning: could not remove created directory {}: {}",
                req.target_dir.display(),
                e
            );
        }
    } else {
        displaylevel!(
            2,
            "warning: leaving partially extracted files in {}",
            req.target_dir.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressor_args_basic() {
        assert_eq!(compressor_args(9, false), vec!["-T0", "-9"]);
    }

    #[test]
    fn compressor_args_force() {
        assert_eq!(compressor_args(3, true), vec!["-T0", "-3", "-f"]);
    }

    #[test]
    fn compressor_args_ultra_threshold() {
        assert_eq!(compressor_args(19, false), vec!["-T0", "-19"]);
        assert_eq!(compressor_args(20, false), vec!["-T0", "-20", "--ultra"]);
        assert_eq!(compressor_args(22, false), vec!["-T0", "-22", "--ultra"]);
    }

    #[test]
    fn compressor_args_force_and_ultra() {
        assert_eq!(
            compressor_args(22, true),
            vec!["-T0", "-22", "-f", "--ultra"]
        );
    }
}
