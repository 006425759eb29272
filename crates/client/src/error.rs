//! Error types for the session controller.
//!
//! `Display` on the upload and chat errors is the exact text shown to the
//! user, so callers can surface them without further formatting.

use thiserror::Error;

/// Failures of the upload flow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Please select a file to upload.")]
    NoFileSelected,

    #[error("An upload is already in progress.")]
    Busy,

    /// Non-2xx response; the body is shown verbatim
    #[error("Upload failed: {body}")]
    Rejected { status: u16, body: String },

    /// Connection-level failure; the reason is only logged
    #[error("Error uploading file.")]
    Transport(String),

    /// 2xx response whose body is not a form document
    #[error("Error parsing response.")]
    MalformedResponse(String),
}

impl UploadError {
    /// True for failures detected locally, before any request was made
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::NoFileSelected | Self::Busy)
    }
}

/// Failures of the chat flow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Please upload a document before asking questions.")]
    NoSession,

    #[error("Please enter a question.")]
    EmptyQuestion,

    #[error("Error: {body}")]
    Rejected { status: u16, body: String },

    #[error("Error contacting the server.")]
    Transport(String),

    #[error("Error contacting the server.")]
    MalformedResponse(String),
}

impl ChatError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::NoSession | Self::EmptyQuestion)
    }
}

/// Rejected field edits. The document is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Unknown section '{0}' (expected Primary, Spouse or Dependents)")]
    UnknownSection(String),

    #[error("Unknown field '{key}' in section {section}")]
    UnknownField { section: &'static str, key: String },

    #[error("Invalid dependent index '{0}'")]
    InvalidIndex(String),

    #[error("Invalid dependent record: {0}")]
    InvalidRecord(String),

    #[error("Dependent {index} does not exist ({len} dependents)")]
    DependentOutOfRange { index: usize, len: usize },
}

/// Invalid client configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
}
