//! Binary entry point for the `tzst` command-line tool.
//!
//! # Control flow
//!
//! 1. [`resolve`] turns `argv` into an immutable [`Operation`] (or prints
//!    usage and exits 0).
//! 2. [`ensure_dependencies`] probes for `tar` and `zstd`; on macOS it may
//!    offer an interactive Homebrew install of the compressor.
//! 3. The preflight validator runs the mode-specific safety checks.
//! 4. The pipeline executor spawns the two external stages.
//!
//! Every failure path prints `tzst: <diagnostic>` to stderr and exits 1;
//! help, an empty invocation, and a declined install exit 0.

use tzst::cli::args::{resolve, Operation, Resolution};
use tzst::cli::constants::PROGRAM_NAME;
use tzst::deps::{ensure_dependencies, DepOutcome, StdinConfirm};
use tzst::pipeline::{execute_pack, execute_unpack};
use tzst::preflight::{validate_pack, validate_unpack};

fn run() -> anyhow::Result<()> {
    let operation = match resolve(PROGRAM_NAME)? {
        Resolution::Help => return Ok(()),
        Resolution::Run(op) => op,
    };

    tzst::displaylevel!(
        3,
        "*** {} v{} ***",
        PROGRAM_NAME,
        tzst::TZST_VERSION_STRING
    );

    // Dependency probing happens only for real operations — help paths must
    // never block on the interactive prompt.
    let mut confirm = StdinConfirm;
    if ensure_dependencies(&mut confirm)? == DepOutcome::Declined {
        return Ok(());
    }

    match operation {
        Operation::Pack(req) => {
            validate_pack(&req)?;
            execute_pack(&req)?;
        }
        Operation::Unpack(req) => {
            let plan = validate_unpack(&req)?;
            execute_unpack(&req, &plan)?;
        }
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", PROGRAM_NAME, e);
        std::process::exit(1);
    }
}
