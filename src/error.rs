//! Error types for glosa operations.

use thiserror::Error;

/// Errors that can occur while loading editions or aligning notes.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A passage boundary id that does not occur in the source document.
    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Invalid notes: {0}")]
    InvalidNotes(String),

    #[error("Unknown note: {0}")]
    UnknownNote(String),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;
