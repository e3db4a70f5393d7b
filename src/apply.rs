//! Rewriting the index file from the expected view, behind a typed confirmation.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::{Path, PathBuf};

use crate::describe;
use crate::error::{Error, Result};
use crate::index::{render, IndexTree};
use crate::reconcile::Reconciliation;

const CONFIRMATION: &str = "yes";

/// Where the operator's answer comes from.
pub trait ConfirmSource {
    /// One line of input; an empty string means end of input.
    fn read_line(&mut self) -> Result<String>;
}

/// Reads stdin when it is a terminal, otherwise the controlling terminal.
///
/// Never reads a redirected stdin, so a pipeline cannot answer for the operator.
#[derive(Debug, Clone)]
pub struct TerminalConfirm {
    tty: PathBuf,
    stdin_terminal: bool,
}

impl TerminalConfirm {
    pub fn new() -> Self {
        TerminalConfirm {
            tty: PathBuf::from("/dev/tty"),
            stdin_terminal: io::stdin().is_terminal(),
        }
    }
}

impl Default for TerminalConfirm {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmSource for TerminalConfirm {
    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.stdin_terminal {
            io::stdin()
                .lock()
                .read_line(&mut line)
                .map_err(|e| Error::io("<stdin>", e))?;
            return Ok(line);
        }
        if !self.tty.exists() {
            return Err(Error::NoTerminal("stdin must be a TTY".to_string()));
        }
        let tty = File::open(&self.tty).map_err(|e| {
            Error::NoTerminal(format!("failed to read {}: {}", self.tty.display(), e))
        })?;
        BufReader::new(tty).read_line(&mut line).map_err(|e| {
            Error::NoTerminal(format!("failed to read {}: {}", self.tty.display(), e))
        })?;
        Ok(line)
    }
}

/// Whether applying would change the file: a structural finding, or a
/// missing description the doc comment can fill.
pub fn has_pending_changes(tree: &IndexTree, reconciliation: &Reconciliation) -> bool {
    reconciliation.has_structural_changes() || describe::has_fixable_descriptions(tree)
}

fn say(out: &mut dyn Write, text: &str) -> Result<()> {
    writeln!(out, "{}", text)
        .and_then(|_| out.flush())
        .map_err(|e| Error::io("<stdout>", e))
}

/// Ask for confirmation and, on `yes`, overwrite `index_path` with the expected view.
///
/// Returns whether the file was written.
pub fn apply(
    tree: &mut IndexTree,
    reconciliation: &Reconciliation,
    index_path: &Path,
    confirm: &mut dyn ConfirmSource,
    out: &mut dyn Write,
) -> Result<bool> {
    if !has_pending_changes(tree, reconciliation) {
        say(out, "No high-confidence updates to apply.")?;
        return Ok(false);
    }

    say(
        out,
        "Apply will overwrite the entire index file, including overview and table of contents.",
    )?;
    say(out, "Type 'yes' to confirm.")?;

    let answer = confirm.read_line()?;
    if answer.trim().to_lowercase() != CONFIRMATION {
        say(out, "Apply canceled.")?;
        return Ok(false);
    }

    describe::carry_over(tree);
    describe::populate_missing(tree);
    let content = render(tree);
    fs::write(index_path, content).map_err(|e| Error::io(index_path, e))?;
    log::info!("wrote {}", index_path.display());
    say(out, "Index file updated.")?;
    Ok(true)
}
