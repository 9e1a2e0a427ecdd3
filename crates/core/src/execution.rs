use std::io::Write;
use std::process::{Command, Stdio};

use log::{debug, info};

use crate::error::{Error, Result};

/// Candidate clipboard writers, probed in order.
const CLIPBOARD_TOOLS: &[&str] = &["pbcopy", "wl-copy", "xclip"];

/// Runs a stored snippet as a blocking foreground child of `shell`.
///
/// The shell is given `-i` so it reads the user's interactive profile,
/// matching what the user would get pasting the snippet into a terminal.
///
/// # Errors
///
/// Returns [`Error::SnippetExit`] carrying the child's status code when it
/// exits non-zero, or an IO error if the child cannot be spawned.
pub fn run_snippet(shell: &str, snippet: &str) -> Result<()> {
    info!("Executing snippet under `{shell}`");

    let status = Command::new(shell)
        .args(["-i", "-c", snippet])
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()?
        .wait()?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::SnippetExit(status.code().unwrap_or(1)))
    }
}

/// Pipes `text` into the first clipboard tool available on this system.
///
/// # Errors
///
/// Returns [`Error::ExternalToolUnavailable`] when no clipboard tool can be
/// spawned, or an IO error if writing to the tool fails.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    for tool in CLIPBOARD_TOOLS {
        let spawned = Command::new(tool)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Clipboard tool `{tool}` not found, trying next");
                continue;
            }
            Err(e) => return Err(Error::SubProcess(e)),
        };

        // Take stdin so it closes before the wait; the tool reads until EOF.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }
        child.wait()?;
        return Ok(());
    }

    Err(Error::ExternalToolUnavailable(format!(
        "no clipboard tool found (tried {})",
        CLIPBOARD_TOOLS.join(", ")
    )))
}
