//! docintake Client
//!
//! Session controller for the document intake flow: upload a document,
//! edit the fields the backend extracted from it, and chat about it.
//!
//! All state is owned by a [`ClientState`]; network access goes through a
//! [`Backend`]. Nothing is persisted.

pub mod backend;
pub mod chat;
pub mod config;
pub mod error;
pub mod fields;
pub mod state;
pub mod upload;

pub use backend::Backend;
pub use chat::{ChatTranscript, PendingQuestion};
pub use config::{ClientConfig, DEFAULT_SERVER_URL};
pub use error::{ChatError, ConfigError, FieldError, UploadError};
pub use fields::{FieldEdit, Section};
pub use state::{ClientState, Session};
pub use upload::{PendingUpload, UploadFile, UploadStatus, UploadSuccess};
