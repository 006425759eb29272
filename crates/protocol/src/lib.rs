//! docintake Protocol
//!
//! Shared types for communication between the docintake client and the
//! document backend. These types are serialized as JSON over HTTP.

use uuid::Uuid;

// Re-exports
pub mod client;
pub mod server;
pub mod types;

pub use client::ChatRequest;
pub use server::ChatResponse;
pub use types::*;

/// Upload endpoint (multipart body, one file part)
pub const UPLOAD_PATH: &str = "/api/upload";

/// Chat endpoint (JSON body)
pub const CHAT_PATH: &str = "/api/chat";

/// Multipart field name carrying the uploaded file
pub const UPLOAD_FIELD: &str = "file";

/// Header binding a chat request to an upload session.
/// The backend emits it on upload responses; lookups are case-insensitive.
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Generate a new unique ID
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
