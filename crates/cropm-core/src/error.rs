//! Core error types for cropm-core.
//!
//! Uses `thiserror` for structured, matchable variants. Decode and archive
//! failures are kept apart so callers can report "not base64" and "not a zip"
//! differently.

use thiserror::Error;

/// Errors produced by the cropm-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required form field was absent.
    #[error("missing field: '{field}'")]
    MissingField { field: String },

    /// The model type is neither `unit` nor `composition`.
    #[error("Unknown model type: {name}")]
    UnknownModelType { name: String },

    /// A package name is not a single plain path component.
    #[error("invalid package name: '{name}'")]
    InvalidPackageName { name: String },

    /// A data URI has no `base64,` payload marker.
    #[error("data URI has no base64 payload")]
    InvalidDataUri,

    /// The payload is not valid base64.
    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes are not a zip archive.
    #[error("data are not ZIP: {reason}")]
    NotZip { reason: String },

    /// The archive opened but could not be extracted.
    #[error("extraction failed: {reason}")]
    Extraction { reason: String },

    /// Building an archive failed.
    #[error("archive error: {reason}")]
    Archive { reason: String },

    /// Filesystem access failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
