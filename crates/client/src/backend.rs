//! HTTP transport to the document backend.
//!
//! Thin wrapper over `reqwest`: builds the two requests and hands the raw
//! response back. Interpreting status codes and bodies is done by the flows.

use docintake_protocol::{ChatRequest, CHAT_PATH, SESSION_HEADER, UPLOAD_FIELD, UPLOAD_PATH};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use tracing::debug;

use crate::config::ClientConfig;
use crate::upload::UploadFile;

/// Connection to the backend. Cheap to clone; no timeouts are applied.
#[derive(Debug, Clone)]
pub struct Backend {
    http: Client,
    config: ClientConfig,
}

impl Backend {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Use a preconfigured `reqwest` client (proxies, TLS roots, ...)
    pub fn with_client(config: ClientConfig, http: Client) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `POST /api/upload` with the file as the single multipart part
    pub(crate) async fn post_upload(&self, file: &UploadFile) -> reqwest::Result<Response> {
        let body = Body::from(file.bytes().clone());
        let part = Part::stream_with_length(body, file.len() as u64)
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())?;
        let form = Form::new().part(UPLOAD_FIELD, part);
        let url = self.config.endpoint(UPLOAD_PATH);

        debug!(
            component = "backend",
            event = "backend.upload.request",
            url = %url,
            file_name = %file.name(),
            size = file.len(),
        );

        self.http.post(url).multipart(form).send().await
    }

    /// `POST /api/chat` with the session bound through a header
    pub(crate) async fn post_chat(
        &self,
        session_id: &str,
        question: &str,
    ) -> reqwest::Result<Response> {
        let url = self.config.endpoint(CHAT_PATH);

        debug!(
            component = "backend",
            event = "backend.chat.request",
            url = %url,
            session_id = %session_id,
        );

        self.http
            .post(url)
            .header(SESSION_HEADER, session_id)
            .json(&ChatRequest::new(question))
            .send()
            .await
    }
}
