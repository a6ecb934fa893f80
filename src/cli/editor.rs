//! Launching the user's editor on an entry file

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Splits an editor setting like `code --wait` into program and arguments
fn split_command(editor: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = editor.split_whitespace();
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// Opens `path` in `editor` and waits for it to exit
pub fn launch(editor: &str, path: &Path) -> Result<()> {
    let Some((program, args)) = split_command(editor) else {
        bail!("no editor found: set PEA_EDITOR, VISUAL or EDITOR");
    };

    let status = Command::new(program)
        .args(&args)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to launch editor: {}", program))?;

    if !status.success() {
        bail!("editor '{}' exited with {}", editor, status);
    }
    Ok(())
}
