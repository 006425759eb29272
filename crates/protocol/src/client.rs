//! Client → Backend messages

use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`. The session id travels in a header, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

impl ChatRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}
