//! Copy-to-clipboard side channel for code blocks.
//!
//! Copies never block rendering and never fail loudly: every attempt ends in
//! a [`CopyOutcome`] that callers turn into a transient [`Notification`].

use std::sync::{Arc, Mutex};

use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const METRIC_CLIPBOARD_COPY_TOTAL: &str = "folio_clipboard_copy_total";

/// Exact text a copy action writes. Never trimmed or re-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ClipboardPayload(String);

impl ClipboardPayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard is unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    Write(String),
}

/// A destination for copied text.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CopyOutcome {
    Copied { bytes: usize },
    Failed { reason: String },
}

impl CopyOutcome {
    pub fn is_copied(&self) -> bool {
        matches!(self, Self::Copied { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Copied { .. } => "copied",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn notification(&self) -> Notification {
        match self {
            Self::Copied { .. } => Notification {
                kind: NotificationKind::Success,
                title: "Copied!",
                message: "Code copied to clipboard".to_string(),
            },
            Self::Failed { reason } => Notification {
                kind: NotificationKind::Error,
                title: "Copy failed",
                message: reason.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

/// Short-lived toast shown after a copy attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: &'static str,
    pub message: String,
}

pub fn copy_to_clipboard(clipboard: &dyn Clipboard, payload: &ClipboardPayload) -> CopyOutcome {
    let outcome = match clipboard.write_text(payload.as_str()) {
        Ok(()) => {
            debug!(
                target = "folio::application::clipboard",
                bytes = payload.len(),
                "code copied to clipboard"
            );
            CopyOutcome::Copied {
                bytes: payload.len(),
            }
        }
        Err(err) => {
            warn!(
                target = "folio::application::clipboard",
                error = %err,
                "clipboard copy failed"
            );
            CopyOutcome::Failed {
                reason: err.to_string(),
            }
        }
    };

    counter!(METRIC_CLIPBOARD_COPY_TOTAL, "outcome" => outcome.label()).increment(1);
    outcome
}

/// Handle to a copy running off the caller's task.
#[derive(Debug)]
pub struct CopyHandle {
    inner: JoinHandle<CopyOutcome>,
}

impl CopyHandle {
    /// Wait for the copy to settle. A panicked or cancelled copy is a failure, not a panic.
    pub async fn outcome(self) -> CopyOutcome {
        match self.inner.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    target = "folio::application::clipboard",
                    error = %err,
                    "clipboard task did not complete"
                );
                CopyOutcome::Failed {
                    reason: "clipboard task did not complete".to_string(),
                }
            }
        }
    }
}

/// Start a copy on the blocking pool and return immediately.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_copy(clipboard: Arc<dyn Clipboard>, payload: ClipboardPayload) -> CopyHandle {
    let inner =
        tokio::task::spawn_blocking(move || copy_to_clipboard(clipboard.as_ref(), &payload));
    CopyHandle { inner }
}

/// In-process clipboard that records every write.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.writes().pop()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut writes = self
            .writes
            .lock()
            .map_err(|_| ClipboardError::Unavailable("memory clipboard is poisoned".into()))?;
        writes.push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unplugged;

    impl Clipboard for Unplugged {
        fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Unavailable("no display".into()))
        }
    }

    #[test]
    fn copy_writes_exact_bytes() {
        let clipboard = MemoryClipboard::new();
        let payload = ClipboardPayload::new("  indented\n\ttab\n");

        let outcome = copy_to_clipboard(&clipboard, &payload);

        assert_eq!(outcome, CopyOutcome::Copied { bytes: 16 });
        assert_eq!(clipboard.last().as_deref(), Some("  indented\n\ttab\n"));
    }

    #[test]
    fn failure_becomes_error_notification() {
        let outcome = copy_to_clipboard(&Unplugged, &ClipboardPayload::new("x"));
        let notification = outcome.notification();

        assert!(!outcome.is_copied());
        assert_eq!(notification.kind, NotificationKind::Error);
        assert!(notification.message.contains("no display"));
    }

    #[test]
    fn success_notification_matches_toast_copy() {
        let notification = CopyOutcome::Copied { bytes: 3 }.notification();
        assert_eq!(notification.title, "Copied!");
        assert_eq!(notification.message, "Code copied to clipboard");
    }

    #[tokio::test]
    async fn spawned_copy_settles_off_task() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let handle = spawn_copy(clipboard.clone(), ClipboardPayload::new("npm run dev"));

        assert_eq!(handle.outcome().await, CopyOutcome::Copied { bytes: 11 });
        assert_eq!(clipboard.writes(), vec!["npm run dev".to_string()]);
    }
}
