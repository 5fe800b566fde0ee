//! Clipboard
//!
//! Write-only clipboard access for copying generated output.

use crate::utils::error::{AppError, AppResult};

/// Destination for copied text.
pub trait ClipboardSink {
    fn copy_text(&mut self, text: &str) -> AppResult<()>;
}

/// The system clipboard.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn copy_text(&mut self, text: &str) -> AppResult<()> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| AppError::clipboard(format!("Clipboard unavailable: {}", e)))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| AppError::clipboard(format!("Failed to copy text: {}", e)))?;
        tracing::debug!(chars = text.chars().count(), "copied to clipboard");
        Ok(())
    }
}

/// Collects copies in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub copies: Vec<String>,
}

impl ClipboardSink for MemoryClipboard {
    fn copy_text(&mut self, text: &str) -> AppResult<()> {
        self.copies.push(text.to_string());
        Ok(())
    }
}

/// Copy `text`, refusing to put an empty string on the clipboard.
pub fn copy_output(sink: &mut dyn ClipboardSink, text: &str) -> AppResult<()> {
    if text.is_empty() {
        return Err(AppError::validation("Nothing to copy"));
    }
    sink.copy_text(text)
}
