//! Upload flow
//!
//! Runs in three steps so the in-flight state is observable:
//!
//! 1. [`ClientState::begin_upload`] validates, raises the busy flag and
//!    returns a [`PendingUpload`].
//! 2. [`PendingUpload::send`] performs the request without touching state.
//! 3. [`ClientState::finish_upload`] applies the outcome and always lowers
//!    the busy flag.
//!
//! [`ClientState::submit_upload`] chains the three.

use std::path::Path;

use bytes::Bytes;
use docintake_protocol::{new_id, FormDocument, SESSION_HEADER};
use tracing::{info, warn};

use crate::backend::Backend;
use crate::error::UploadError;
use crate::state::{ClientState, Session};

// ---------------------------------------------------------------------------
// UploadFile
// ---------------------------------------------------------------------------

/// A user-selected file, held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    name: String,
    bytes: Bytes,
    mime_type: &'static str,
}

impl UploadFile {
    /// MIME type is guessed from the file name's extension.
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let name = name.into();
        let mime_type = guess_mime_type(&name);
        Self {
            name,
            bytes: bytes.into(),
            mime_type,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn guess_mime_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Outcome of the most recent upload, as shown to the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Processed,
    Failed(UploadError),
}

impl UploadStatus {
    /// User-visible status line. Empty while idle or uploading.
    pub fn message(&self) -> String {
        match self {
            UploadStatus::Idle | UploadStatus::Uploading => String::new(),
            UploadStatus::Processed => "File processed successfully.".to_string(),
            UploadStatus::Failed(err) => err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadStatus::Processed)
    }
}

// ---------------------------------------------------------------------------
// In-flight upload
// ---------------------------------------------------------------------------

/// Parsed result of a 2xx upload response
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSuccess {
    pub document: FormDocument,
    pub session: Option<Session>,
}

/// An upload that has passed validation and holds the busy flag
#[derive(Debug)]
#[must_use = "send the upload and pass the result to `finish_upload`"]
pub struct PendingUpload {
    id: String,
    file: UploadFile,
}

impl PendingUpload {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file(&self) -> &UploadFile {
        &self.file
    }

    /// Perform the request and classify the response.
    pub async fn send(&self, backend: &Backend) -> Result<UploadSuccess, UploadError> {
        let response = backend.post_upload(&self.file).await.map_err(|e| {
            warn!(
                component = "upload",
                event = "upload.transport_failed",
                upload_id = %self.id,
                error = %e,
                "Upload request failed"
            );
            UploadError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let session = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(Session::from_header);
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        interpret_upload_response(status, session, body)
    }
}

/// Map a raw upload response onto the upload taxonomy.
/// The session header only counts when the body parses.
pub(crate) fn interpret_upload_response(
    status: u16,
    session: Option<Session>,
    body: String,
) -> Result<UploadSuccess, UploadError> {
    if !(200..300).contains(&status) {
        return Err(UploadError::Rejected { status, body });
    }

    let document =
        FormDocument::from_json(&body).map_err(|e| UploadError::MalformedResponse(e.to_string()))?;

    Ok(UploadSuccess { document, session })
}

// ---------------------------------------------------------------------------
// State transitions
// ---------------------------------------------------------------------------

impl ClientState {
    /// Validate the selection and raise the busy flag.
    ///
    /// With no file the status becomes the validation message. While another
    /// upload is outstanding the call is refused and state is not touched.
    pub fn begin_upload(&mut self, file: Option<UploadFile>) -> Result<PendingUpload, UploadError> {
        if self.uploading {
            warn!(
                component = "upload",
                event = "upload.refused_busy",
                "Upload already in progress"
            );
            return Err(UploadError::Busy);
        }

        let Some(file) = file else {
            self.upload_status = UploadStatus::Failed(UploadError::NoFileSelected);
            return Err(UploadError::NoFileSelected);
        };

        let pending = PendingUpload { id: new_id(), file };
        self.uploading = true;
        self.upload_status = UploadStatus::Uploading;

        info!(
            component = "upload",
            event = "upload.started",
            upload_id = %pending.id,
            file_name = %pending.file.name(),
            size = pending.file.len(),
        );

        Ok(pending)
    }

    /// Apply an upload outcome. Lowers the busy flag on every path.
    ///
    /// Success replaces the whole document with the parsed one. A session
    /// header, when present, replaces the current session.
    pub fn finish_upload(
        &mut self,
        pending: PendingUpload,
        result: Result<UploadSuccess, UploadError>,
    ) -> Result<(), UploadError> {
        self.uploading = false;

        match result {
            Ok(UploadSuccess { document, session }) => {
                self.document = document;
                if let Some(session) = session {
                    info!(
                        component = "upload",
                        event = "upload.session_established",
                        upload_id = %pending.id,
                        session_id = %session.id(),
                        replaced = self.session.is_some(),
                    );
                    self.session = Some(session);
                }
                self.upload_status = UploadStatus::Processed;

                info!(
                    component = "upload",
                    event = "upload.processed",
                    upload_id = %pending.id,
                    dependents = self.document.dependents.len(),
                    chat_enabled = self.chat_enabled(),
                );
                Ok(())
            }
            Err(err) => {
                match &err {
                    UploadError::Rejected { status, .. } => warn!(
                        component = "upload",
                        event = "upload.rejected",
                        upload_id = %pending.id,
                        status = *status,
                    ),
                    UploadError::MalformedResponse(reason) => warn!(
                        component = "upload",
                        event = "upload.malformed_response",
                        upload_id = %pending.id,
                        reason = %reason,
                    ),
                    _ => {}
                }
                self.upload_status = UploadStatus::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// Upload a file end to end: validate, send, apply.
    pub async fn submit_upload(
        &mut self,
        backend: &Backend,
        file: Option<UploadFile>,
    ) -> Result<(), UploadError> {
        let pending = self.begin_upload(file)?;
        let result = pending.send(backend).await;
        self.finish_upload(pending, result)
    }
}
