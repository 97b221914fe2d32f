//! System clipboard backed by an external program (`wl-copy`, `xclip`, `pbcopy`, ...).

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::time::Instant;

use tracing::{debug, warn};

use crate::application::clipboard::{Clipboard, ClipboardError};
use crate::config::ClipboardSettings;

/// Pipes copied text to the stdin of a configured command.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    command: String,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_settings(settings: &ClipboardSettings) -> Self {
        Self::new(settings.command.clone(), settings.args.clone())
    }
}

impl Clipboard for CommandClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let started_at = Instant::now();

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                warn!(
                    target = "folio::infra::clipboard",
                    command = %self.command,
                    error = %err,
                    "failed to spawn clipboard command"
                );
                if err.kind() == ErrorKind::NotFound {
                    ClipboardError::Unavailable(format!("`{}` was not found", self.command))
                } else {
                    ClipboardError::Unavailable(err.to_string())
                }
            })?;

        // Dropping stdin closes the pipe so the command sees EOF.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .map_err(|err| ClipboardError::Write(err.to_string()))?;

        if let Err(err) = written {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                target = "folio::infra::clipboard",
                command = %self.command,
                error = %err,
                stderr = %stderr,
                "clipboard command stopped reading input"
            );
            let reason = if stderr.is_empty() {
                err.to_string()
            } else {
                stderr
            };
            return Err(ClipboardError::Write(reason));
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let exit_code = output.status.code().map(i64::from).unwrap_or(-1);
            warn!(
                target = "folio::infra::clipboard",
                command = %self.command,
                exit_code,
                stderr = %stderr,
                "clipboard command failed"
            );
            let reason = if stderr.is_empty() {
                format!("`{}` exited with status {exit_code}", self.command)
            } else {
                stderr
            };
            return Err(ClipboardError::Write(reason));
        }

        debug!(
            target = "folio::infra::clipboard",
            command = %self.command,
            bytes = text.len(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "clipboard command completed"
        );
        Ok(())
    }
}
