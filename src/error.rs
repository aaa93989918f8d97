//! Error types for folio.

use std::io;
use thiserror::Error;

/// Result type alias for folio operations.
pub type Result<T> = std::result::Result<T, FolioError>;

/// Errors surfaced by configuration, layout and export.
///
/// A reflow pass itself never fails on degenerate input (empty documents,
/// hidden or unmeasurable elements); those degrade to "nothing to do".
#[derive(Error, Debug)]
pub enum FolioError {
    /// I/O error when reading templates, configs or fonts, or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialisation failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A font file could not be parsed.
    #[error("Font error: {0}")]
    Font(String),

    /// The layout engine rejected the document tree.
    #[error("Layout error: {0}")]
    Layout(String),

    /// PDF rendering failed.
    #[error("Render error: {0}")]
    Render(String),

    /// Manual gap controls are only available in adjustment mode.
    #[error("Gap adjustments require adjustment mode to be enabled")]
    AdjustmentModeOff,
}

impl From<taffy::TaffyError> for FolioError {
    fn from(err: taffy::TaffyError) -> Self {
        FolioError::Layout(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FolioError::Config("page_height must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: page_height must be positive"
        );
        assert_eq!(
            FolioError::AdjustmentModeOff.to_string(),
            "Gap adjustments require adjustment mode to be enabled"
        );
    }

    #[test]
    fn io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing.html");
        let err: FolioError = io_err.into();
        assert!(matches!(err, FolioError::Io(_)));
    }
}
