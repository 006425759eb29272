//! Backend → Client messages
//!
//! The upload response body is a [`FormDocument`](crate::FormDocument);
//! only the chat reply needs its own envelope.

use serde::{Deserialize, Serialize};

/// Successful body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}
