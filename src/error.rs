//! Error types for the PDF prompter

use thiserror::Error;

/// Result type alias for the PDF prompter
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the PDF prompter
#[derive(Error, Debug)]
pub enum Error {
    /// No document has been uploaded yet
    #[error("No active document")]
    NoDocument,

    /// Uploaded data could not be parsed as a PDF
    #[error("Unreadable document: {reason}")]
    UnreadableDocument { reason: String },

    /// Rasterization, measurement or display backend failed
    #[error("Render failure: {reason}")]
    RenderFailure { reason: String },

    /// PDF file not found
    #[error("PDF not found: {path}")]
    PdfNotFound { path: String },

    /// Path access denied (outside allowed resource directories)
    #[error("Path access denied: {path}")]
    PathAccessDenied { path: String },

    /// Upload too large
    #[error("Upload too large: {size} bytes (max: {max_size} bytes)")]
    UploadTooLarge { size: u64, max_size: u64 },

    /// Font file could not be loaded
    #[error("Failed to load font: {reason}")]
    FontLoad { reason: String },

    /// Base64 decode error
    #[error("Invalid base64 data: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Return a sanitized error message safe to send to clients.
    /// Internal details (paths, library errors, file sizes) are omitted.
    /// Full details should be logged via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::NoDocument => "No document uploaded".to_string(),
            Error::UnreadableDocument { .. } => "Unreadable document".to_string(),
            Error::RenderFailure { .. } => "Render failure".to_string(),
            Error::PdfNotFound { .. } => "PDF not found".to_string(),
            Error::PathAccessDenied { .. } => "Access denied".to_string(),
            Error::UploadTooLarge { max_size, .. } => {
                format!("Upload exceeds maximum size of {} bytes", max_size)
            }
            Error::FontLoad { .. } => "Font unavailable".to_string(),
            Error::Base64Decode(_) => "Invalid base64 data".to_string(),
            Error::Io(_) => "I/O error".to_string(),
            Error::Serialization(_) => "Serialization error".to_string(),
        }
    }

    pub(crate) fn render(reason: impl std::fmt::Display) -> Self {
        Error::RenderFailure {
            reason: reason.to_string(),
        }
    }
}
