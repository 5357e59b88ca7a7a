//! System clipboard access.

use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(#[from] arboard::Error);

/// Lazily opened system clipboard.
///
/// The handle is kept for the rest of the session: on X11 the copied text
/// only stays available while its owner is alive.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.inner.is_none() {
            self.inner = Some(arboard::Clipboard::new()?);
        }
        if let Some(clipboard) = self.inner.as_mut() {
            clipboard.set_text(text.to_owned())?;
        }
        debug!(bytes = text.len(), "copied to clipboard");
        Ok(())
    }
}

/// Status line message for a copy attempt.
pub fn copy_status(text: &str, result: &Result<(), ClipboardError>) -> String {
    match result {
        Ok(()) if text.is_empty() => "Copied empty preview".to_string(),
        Ok(()) => format!("Copied {} characters to clipboard", text.chars().count()),
        Err(err) => format!("Clipboard copy failed: {err}"),
    }
}
