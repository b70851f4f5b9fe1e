//! External capability probing and (on macOS) interactive installation of
//! the missing compressor.
//!
//! Probing is `PATH`-based via the `which` crate.  The archiver is a hard
//! requirement on every platform — there is no auto-install path for it,
//! only guidance text.  The compressor can be installed interactively
//! through Homebrew on macOS; the yes/no prompt sits behind the [`Confirm`]
//! trait so tests can script it without a terminal.

use std::io::{self, BufRead, Write};

use anyhow::bail;
use which::which;

use crate::cli::constants::{ARCHIVER_BIN, COMPRESSOR_BIN};

/// Injectable yes/no prompt.
pub trait Confirm {
    /// Ask the user `prompt`; `Ok(true)` means yes.
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

/// Interactive [`Confirm`] reading one line from standard input.
/// Anything other than `y`/`yes` (case-insensitive) is a no.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        eprint!("{} [y/N] ", prompt);
        io::stderr().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        let answer = line.trim();
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }
}

/// Result of a successful dependency probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepOutcome {
    /// Both external tools are available.
    Ready,
    /// The user declined the offered install; abort without an error code.
    Declined,
}

/// Verify that the archiver and compressor are reachable, offering an
/// interactive install of the compressor where the platform supports it.
pub fn ensure_dependencies(confirm: &mut dyn Confirm) -> anyhow::Result<DepOutcome> {
    if which(ARCHIVER_BIN).is_err() {
        bail!(
            "{} is required but was not found on PATH; install it with your \
             system package manager",
            ARCHIVER_BIN
        );
    }

    if which(COMPRESSOR_BIN).is_ok() {
        return Ok(DepOutcome::Ready);
    }

    install_compressor(confirm)
}

#[cfg(target_os = "macos")]
fn install_compressor(confirm: &mut dyn Confirm) -> anyhow::Result<DepOutcome> {
    use anyhow::Context;

    crate::displaylevel!(1, "{} was not found on PATH", COMPRESSOR_BIN);
    let prompt = format!("{} is required. Install it via Homebrew?", COMPRESSOR_BIN);
    if !confirm.confirm(&prompt)? {
        crate::displaylevel!(1, "aborting at user request");
        return Ok(DepOutcome::Declined);
    }
    if which("brew").is_err() {
        bail!(
            "Homebrew is not installed; get it from https://brew.sh, then run: \
             brew install {}",
            COMPRESSOR_BIN
        );
    }
    let status = std::process::Command::new("brew")
        .args(["install", COMPRESSOR_BIN])
        .status()
        .context("failed to run brew")?;
    if !status.success() {
        bail!("brew install {} failed", COMPRESSOR_BIN);
    }
    // Re-probe; a successful brew run does not guarantee a usable binary.
    if which(COMPRESSOR_BIN).is_err() {
        bail!("{} is still not found after installation", COMPRESSOR_BIN);
    }
    Ok(DepOutcome::Ready)
}

#[cfg(not(target_os = "macos"))]
fn install_compressor(_confirm: &mut dyn Confirm) -> anyhow::Result<DepOutcome> {
    bail!(
        "{} is required but was not found on PATH; install it with e.g. \
         'apt install zstd', 'dnf install zstd', 'pacman -S zstd' or \
         'zypper install zstd'",
        COMPRESSOR_BIN
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted [`Confirm`] that records whether it was asked.
    struct Scripted {
        answer: bool,
        asked: bool,
    }

    impl Confirm for Scripted {
        fn confirm(&mut self, _prompt: &str) -> io::Result<bool> {
            self.asked = true;
            Ok(self.answer)
        }
    }

    #[test]
    fn ready_when_both_tools_present() {
        // Only meaningful on hosts that actually have tar and zstd; skip
        // silently elsewhere so the suite stays green on minimal runners.
        if which(ARCHIVER_BIN).is_err() || which(COMPRESSOR_BIN).is_err() {
            return;
        }
        let mut confirm = Scripted {
            answer: false,
            asked: false,
        };
        let outcome = ensure_dependencies(&mut confirm).unwrap();
        assert_eq!(outcome, DepOutcome::Ready);
        // No prompt may be shown when nothing is missing.
        assert!(!confirm.asked);
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn missing_compressor_is_fatal_without_prompt() {
        let mut confirm = Scripted {
            answer: true,
            asked: false,
        };
        let e = install_compressor(&mut confirm).unwrap_err();
        assert!(e.to_string().contains("zstd"));
        assert!(!confirm.asked);
    }
}
