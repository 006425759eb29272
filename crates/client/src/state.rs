//! Client state
//!
//! Everything the controller knows lives in one explicitly owned
//! [`ClientState`]. The upload, field and chat handlers are methods on it
//! (see `upload.rs`, `fields.rs`, `chat.rs`); nothing is global.

use docintake_protocol::FormDocument;

use crate::chat::ChatTranscript;
use crate::upload::UploadStatus;

/// Backend-side processing context created by a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
}

impl Session {
    /// Header values that are blank after trimming do not form a session.
    pub(crate) fn from_header(value: &str) -> Option<Self> {
        let id = value.trim();
        if id.is_empty() {
            None
        } else {
            Some(Self { id: id.to_string() })
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// State of one client for the lifetime of a view
#[derive(Debug, Default)]
pub struct ClientState {
    pub(crate) document: FormDocument,
    pub(crate) session: Option<Session>,
    pub(crate) transcript: ChatTranscript,
    pub(crate) upload_status: UploadStatus,
    pub(crate) uploading: bool,
    pub(crate) chat_input: String,
}

impl ClientState {
    /// Blank document, no session, empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &FormDocument {
        &self.document
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Chat is only possible once an upload produced a session
    pub fn chat_enabled(&self) -> bool {
        self.session.is_some()
    }

    pub fn transcript(&self) -> &ChatTranscript {
        &self.transcript
    }

    pub fn upload_status(&self) -> &UploadStatus {
        &self.upload_status
    }

    /// Busy flag: set while an upload request is outstanding
    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Text typed into the chat box but not yet submitted
    pub fn chat_input(&self) -> &str {
        &self.chat_input
    }

    pub fn set_chat_input(&mut self, text: impl Into<String>) {
        self.chat_input = text.into();
    }
}
