//! Copy payloads to the system clipboard

use arboard::Clipboard;

use crate::{Error, Result};

/// Place `text` on the system clipboard so it can be pasted into a bank app.
pub fn copy_text(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| Error::Clipboard(e.to_string()))?;
    tracing::debug!("copied {} chars to clipboard", text.len());
    Ok(())
}

/// Read back the current clipboard text, `None` if it holds no text.
pub fn read_text() -> Result<Option<String>> {
    let mut clipboard = Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
    match clipboard.get_text() {
        Ok(text) if !text.is_empty() => Ok(Some(text)),
        Ok(_) => Ok(None),
        Err(arboard::Error::ContentNotAvailable) => Ok(None),
        Err(e) => Err(Error::Clipboard(e.to_string())),
    }
}
