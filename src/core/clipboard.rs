/*
 * Read-only access to the system clipboard, used to quick-fill identifiers.
 * A clipboard without text content reads as an empty string; only a failure to
 * reach the clipboard at all is an error, so callers can tell "nothing to
 * paste" apart from "not allowed to look".
 */
use arboard::Clipboard;

#[derive(Debug)]
pub enum ClipboardError {
    Unavailable(arboard::Error),
}

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipboardError::Unavailable(e) => write!(f, "Clipboard unavailable: {e}"),
        }
    }
}

impl std::error::Error for ClipboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClipboardError::Unavailable(e) => Some(e),
        }
    }
}

pub trait ClipboardOperations: Send + Sync {
    fn read_text(&self) -> Result<String, ClipboardError>;
}

#[derive(Default)]
pub struct CoreClipboard {}

impl CoreClipboard {
    pub fn new() -> Self {
        CoreClipboard {}
    }
}

impl ClipboardOperations for CoreClipboard {
    fn read_text(&self) -> Result<String, ClipboardError> {
        let mut clipboard = Clipboard::new().map_err(ClipboardError::Unavailable)?;
        match clipboard.get_text() {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => {
                log::debug!("CoreClipboard: Clipboard holds no text.");
                Ok(String::new())
            }
            Err(e) => {
                log::warn!("CoreClipboard: Failed to read clipboard text: {e}");
                Err(ClipboardError::Unavailable(e))
            }
        }
    }
}
