//! `docintake ask <file> <question>...` — upload, then ask each question in order.

use std::path::Path;

use anyhow::Context;
use docintake_client::{Backend, ClientState, UploadFile};

use crate::render;

pub async fn run(backend: &Backend, file: &Path, questions: &[String]) -> anyhow::Result<()> {
    let mut state = ClientState::new();
    let upload = UploadFile::from_path(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    state.submit_upload(backend, Some(upload)).await?;
    render::print_status(&state);

    // Failures are recorded as assistant turns; keep going.
    for question in questions {
        let _ = state.submit_question(backend, question).await;
    }

    render::print_transcript(&state);
    Ok(())
}
