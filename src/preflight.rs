//! Pre-flight safety checks, run after argument resolution and before any
//! external process is spawned.
//!
//! Checks execute in a fixed order, cheapest and most fundamental first
//! (existence before permissions before conflict detection), and stop at the
//! first failure so the diagnostic names the most actionable problem.  The
//! only filesystem mutation performed here is creating a missing unpack
//! target directory — and only after every cheaper check has passed; the
//! [`UnpackPlan`] records that creation so the executor can roll it back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail};

use crate::cli::args::{PackRequest, UnpackRequest};
use crate::util::{is_directory, is_readable, is_reg_file, is_writable};

/// Facts gathered during unpack validation that the executor's rollback
/// depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpackPlan {
    /// The target directory did not exist and was created here.
    pub target_created: bool,
}

/// Validate a pack request.  No filesystem mutation occurs.
///
/// Check order per input (declaration order): canonical-root guard, then
/// existence, then readability.  Then the output parent directory must
/// exist and be writable, and an existing output file is rejected unless
/// `force_overwrite` is set.
pub fn validate_pack(req: &PackRequest) -> anyhow::Result<()> {
    for input in &req.inputs {
        match fs::canonicalize(input) {
            Ok(canonical) => {
                // A path with no parent is the filesystem root; archiving an
                // entire volume is never what the user meant.
                if canonical.parent().is_none() {
                    bail!(
                        "refusing to archive the filesystem root ({})",
                        input.display()
                    );
                }
                if !is_readable(input) {
                    bail!("cannot read {}: permission denied", input.display());
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                bail!("{}: no such file or directory", input.display());
            }
            Err(e) => {
                return Err(anyhow!("cannot resolve {}: {}", input.display(), e));
            }
        }
    }

    let parent = parent_or_cwd(&req.output_path);
    if !is_directory(&parent) {
        bail!("output directory {} does not exist", parent.display());
    }
    if !is_writable(&parent) {
        bail!("output directory {} is not writable", parent.display());
    }

    if req.output_path.exists() && !req.force_overwrite {
        bail!(
            "output file {} already exists (use -f to overwrite)",
            req.output_path.display()
        );
    }

    Ok(())
}

/// Validate an unpack request, creating the target directory when it does
/// not yet exist.
pub fn validate_unpack(req: &UnpackRequest) -> anyhow::Result<UnpackPlan> {
    if !is_reg_file(&req.archive_path) {
        if !req.archive_path.exists() {
            bail!("{}: no such file or directory", req.archive_path.display());
        }
        bail!("{} is not a regular file", req.archive_path.display());
    }

    if req.target_dir.exists() {
        if !is_directory(&req.target_dir) {
            bail!(
                "target {} exists and is not a directory",
                req.target_dir.display()
            );
        }
        if !is_writable(&req.target_dir) {
            bail!(
                "target directory {} is not writable",
                req.target_dir.display()
            );
        }
        return Ok(UnpackPlan {
            target_created: false,
        });
    }

    let parent = parent_or_cwd(&req.target_dir);
    if !is_directory(&parent) {
        bail!(
            "parent directory {} does not exist",
            parent.display()
        );
    }
    if !is_writable(&parent) {
        bail!("parent directory {} is not writable", parent.display());
    }

    fs::create_dir(&req.target_dir).map_err(|e| {
        anyhow!(
            "cannot create target directory {}: {}",
            req.target_dir.display(),
            e
        )
    })?;

    Ok(UnpackPlan {
        target_created: true,
    })
}

/// The directory that will hold `path`: its parent component, or the current
/// working directory when the path has none.
fn parent_or_cwd(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
