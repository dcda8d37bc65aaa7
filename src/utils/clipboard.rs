use anyhow::{Context, Result};
use std::io::Write;
use std::process::{Command, Stdio};

/// Copy text to the system clipboard via the platform utility.
///
/// Callers treat failure as non-fatal: the hex string is still displayed and
/// saved, only the copy is lost.
pub fn copy(text: &str) -> Result<()> {
    let mut command = clipboard_command()?;

    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("failed to spawn clipboard helper")?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin
            .write_all(text.as_bytes())
            .context("failed to write to clipboard helper")?;
    }

    let status = child.wait().context("clipboard helper did not exit")?;
    if !status.success() {
        anyhow::bail!("clipboard helper exited with {}", status);
    }

    Ok(())
}

fn clipboard_command() -> Result<Command> {
    if cfg!(target_os = "macos") {
        return Ok(Command::new("pbcopy"));
    }

    // Wayland first, then X11
    if std::env::var("WAYLAND_DISPLAY").is_ok() {
        return Ok(Command::new("wl-copy"));
    }
    if std::env::var("DISPLAY").is_ok() {
        let mut cmd = Command::new("xclip");
        cmd.args(["-selection", "clipboard"]);
        return Ok(cmd);
    }

    anyhow::bail!("no clipboard utility available (need pbcopy, wl-copy or xclip)")
}
