//! `docintake upload <file>` — upload once and print the extracted fields.

use std::path::Path;

use anyhow::Context;
use docintake_client::{Backend, ClientState, UploadFile};

use crate::render;

pub async fn run(backend: &Backend, file: &Path, json: bool) -> anyhow::Result<()> {
    let mut state = ClientState::new();
    let upload = UploadFile::from_path(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    state.submit_upload(backend, Some(upload)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(state.document())?);
        if let Some(session) = state.session() {
            eprintln!("session: {}", session.id());
        }
    } else {
        render::print_status(&state);
        render::print_document(state.document());
    }
    Ok(())
}
