//! End-to-end checks of the upload / chat protocol against an in-process
//! mock backend.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use docintake_client::{
    Backend, ChatError, ClientConfig, ClientState, UploadError, UploadFile, UploadStatus,
};
use docintake_protocol::{FormDocument, PrimaryField, TurnRole};

// ---------------------------------------------------------------------------
// Mock backend
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct Reply {
    status: StatusCode,
    body: String,
    session: Option<String>,
}

impl Reply {
    fn ok(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
            session: None,
        }
    }

    fn status(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            session: None,
        }
    }

    fn with_session(mut self, id: &str) -> Self {
        self.session = Some(id.to_string());
        self
    }
}

struct ReceivedPart {
    field: String,
    file_name: Option<String>,
    bytes: Vec<u8>,
}

struct ReceivedChat {
    session: Option<String>,
    body: serde_json::Value,
}

struct Mock {
    upload_hits: AtomicUsize,
    chat_hits: AtomicUsize,
    upload_reply: Mutex<Reply>,
    chat_reply: Mutex<Reply>,
    parts: Mutex<Vec<ReceivedPart>>,
    chats: Mutex<Vec<ReceivedChat>>,
}

impl Mock {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            upload_hits: AtomicUsize::new(0),
            chat_hits: AtomicUsize::new(0),
            upload_reply: Mutex::new(Reply::ok("{}")),
            chat_reply: Mutex::new(Reply::ok(r#"{"answer":""}"#)),
            parts: Mutex::new(Vec::new()),
            chats: Mutex::new(Vec::new()),
        })
    }

    fn reply_upload(&self, reply: Reply) {
        *self.upload_reply.lock().unwrap() = reply;
    }

    fn reply_chat(&self, reply: Reply) {
        *self.chat_reply.lock().unwrap() = reply;
    }

    fn upload_hits(&self) -> usize {
        self.upload_hits.load(Ordering::SeqCst)
    }

    fn chat_hits(&self) -> usize {
        self.chat_hits.load(Ordering::SeqCst)
    }
}

fn into_response(reply: Reply) -> Response {
    let mut response = (reply.status, reply.body).into_response();
    if let Some(id) = reply.session {
        response
            .headers_mut()
            .insert("x-session-id", HeaderValue::from_str(&id).unwrap());
    }
    response
}

async fn upload_handler(State(mock): State<Arc<Mock>>, mut multipart: Multipart) -> Response {
    mock.upload_hits.fetch_add(1, Ordering::SeqCst);
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        mock.parts.lock().unwrap().push(ReceivedPart {
            field: name,
            file_name,
            bytes,
        });
    }
    let reply = mock.upload_reply.lock().unwrap().clone();
    into_response(reply)
}

async fn chat_handler(State(mock): State<Arc<Mock>>, headers: HeaderMap, body: String) -> Response {
    mock.chat_hits.fetch_add(1, Ordering::SeqCst);
    let session = headers
        .get("X-Session-Id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
    mock.chats
        .lock()
        .unwrap()
        .push(ReceivedChat { session, body });
    let reply = mock.chat_reply.lock().unwrap().clone();
    into_response(reply)
}

async fn spawn_backend(mock: Arc<Mock>) -> Backend {
    let app = Router::new()
        .route("/api/upload", post(upload_handler))
        .route("/api/chat", post(chat_handler))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    backend_at(addr)
}

fn backend_at(addr: SocketAddr) -> Backend {
    Backend::new(ClientConfig::new(&format!("http://{addr}")).unwrap())
}

/// Address nothing listens on
async fn dead_backend() -> Backend {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    backend_at(addr)
}

fn resume() -> Option<UploadFile> {
    Some(UploadFile::new("resume.pdf", &b"%PDF-1.4 resume"[..]))
}

async fn established(backend: &Backend, mock: &Mock, session: &str) -> ClientState {
    mock.reply_upload(Reply::ok(r#"{"First Name":"Jane","City":"Austin"}"#).with_session(session));
    let mut state = ClientState::new();
    state
        .submit_upload(backend, resume())
        .await
        .expect("upload succeeds");
    state
}

// ---------------------------------------------------------------------------
// Upload flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_without_file_makes_no_request() {
    let mock = Mock::new();
    let backend = spawn_backend(mock.clone()).await;
    let mut state = ClientState::new();

    let err = state.submit_upload(&backend, None).await.unwrap_err();

    assert_eq!(err, UploadError::NoFileSelected);
    assert_eq!(mock.upload_hits(), 0);
    assert_eq!(
        state.upload_status().message(),
        "Please select a file to upload."
    );
    assert!(!state.is_uploading());
}

#[tokio::test]
async fn successful_upload_replaces_document_and_opens_session() {
    let mock = Mock::new();
    let backend = spawn_backend(mock.clone()).await;
    let mut state = ClientState::new();
    state
        .set_field(docintake_client::FieldEdit::Primary {
            field: PrimaryField::Income,
            value: "99000".to_string(),
        })
        .unwrap();

    mock.reply_upload(Reply::ok(r#"{"First Name":"Jane","Dependents":[]}"#).with_session("abc123"));
    state
        .submit_upload(&backend, resume())
        .await
        .expect("upload succeeds");

    let expected = FormDocument::from_json(r#"{"First Name":"Jane","Dependents":[]}"#).unwrap();
    assert_eq!(state.document(), &expected);
    assert_eq!(state.document().income, "");
    assert_eq!(state.session().map(|s| s.id()), Some("abc123"));
    assert!(state.chat_enabled());
    assert_eq!(state.upload_status(), &UploadStatus::Processed);
    assert_eq!(
        state.upload_status().message(),
        "File processed successfully."
    );
    assert!(!state.is_uploading());

    let parts = mock.parts.lock().unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].field, "file");
    assert_eq!(parts[0].file_name.as_deref(), Some("resume.pdf"));
    assert_eq!(parts[0].bytes, b"%PDF-1.4 resume");
}

#[tokio::test]
async fn malformed_upload_body_keeps_previous_document() {
    let mock = Mock::new();
    let backend = spawn_backend(mock.clone()).await;
    let mut state = ClientState::new();
    state
        .set_field(docintake_client::FieldEdit::Primary {
            field: PrimaryField::FirstName,
            value: "Typed by hand".to_string(),
        })
        .unwrap();
    let before = state.document().clone();

    mock.reply_upload(
        Reply::ok("I could not find any of those fields, sorry.").with_session("abc123"),
    );
    let err = state.submit_upload(&backend, resume()).await.unwrap_err();

    assert!(matches!(err, UploadError::MalformedResponse(_)));
    assert_eq!(state.document(), &before);
    assert!(state.session().is_none());
    assert_eq!(state.upload_status().message(), "Error parsing response.");
    assert!(!state.is_uploading());
}

#[tokio::test]
async fn rejected_upload_shows_body_and_changes_nothing() {
    let mock = Mock::new();
    let backend = spawn_backend(mock.clone()).await;
    let mut state = established(&backend, &mock, "abc123").await;
    let before = state.document().clone();

    mock.reply_upload(Reply::status(
        StatusCode::INTERNAL_SERVER_ERROR,
        "file too large",
    ));
    let err = state.submit_upload(&backend, resume()).await.unwrap_err();

    assert_eq!(
        err,
        UploadError::Rejected {
            status: 500,
            body: "file too large".to_string()
        }
    );
    assert_eq!(
        state.upload_status().message(),
        "Upload failed: file too large"
    );
    assert_eq!(state.document(), &before);
    assert_eq!(state.session().map(|s| s.id()), Some("abc123"));
    assert!(!state.is_uploading());
}

#[tokio::test]
async fn unreachable_backend_releases_busy_flag() {
    let backend = dead_backend().await;
    let mut state = ClientState::new();

    let err = state.submit_upload(&backend, resume()).await.unwrap_err();

    assert!(matches!(err, UploadError::Transport(_)));
    assert_eq!(state.upload_status().message(), "Error uploading file.");
    assert!(!state.is_uploading());
    assert!(state.session().is_none());
}

#[tokio::test]
async fn busy_flag_blocks_second_upload_without_request() {
    let mock = Mock::new();
    let backend = spawn_backend(mock.clone()).await;
    let mut state = ClientState::new();

    let pending = state.begin_upload(resume()).expect("first upload starts");
    assert!(state.is_uploading());
    assert_eq!(
        state.begin_upload(resume()).unwrap_err(),
        UploadError::Busy
    );

    let result = pending.send(&backend).await;
    state.finish_upload(pending, result).expect("applies");

    assert_eq!(mock.upload_hits(), 1);
    assert!(!state.is_uploading());
}

// ---------------------------------------------------------------------------
// Chat flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chat_without_session_makes_no_request() {
    let mock = Mock::new();
    let backend = spawn_backend(mock.clone()).await;
    let mut state = ClientState::new();

    let err = state
        .submit_question(&backend, "What is my deduction?")
        .await
        .unwrap_err();

    assert_eq!(err, ChatError::NoSession);
    assert_eq!(mock.chat_hits(), 0);
    let turns = state.transcript().turns();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].role, TurnRole::Assistant);
}

#[tokio::test]
async fn first_upload_without_session_header_keeps_chat_disabled() {
    let mock = Mock::new();
    let backend = spawn_backend(mock.clone()).await;
    let mut state = ClientState::new();

    mock.reply_upload(Reply::ok(r#"{"First Name":"Jane"}"#));
    state
        .submit_upload(&backend, resume())
        .await
        .expect("upload succeeds");

    assert_eq!(state.document().first_name, "Jane");
    assert_eq!(
        state.upload_status().message(),
        "File processed successfully."
    );
    assert!(state.session().is_none());
    assert!(!state.chat_enabled());

    let err = state
        .submit_question(&backend, "hello?")
        .await
        .unwrap_err();
    assert_eq!(err, ChatError::NoSession);
    assert_eq!(mock.chat_hits(), 0);
}

#[tokio::test]
async fn failed_upload_keeps_chat_disabled() {
    let mock = Mock::new();
    let backend = spawn_backend(mock.clone()).await;
    let mut state = ClientState::new();

    mock.reply_upload(Reply::status(StatusCode::BAD_REQUEST, "No file uploaded"));
    let _ = state.submit_upload(&backend, resume()).await;
    let _ = state.submit_question(&backend, "anything?").await;

    assert!(!state.chat_enabled());
    assert_eq!(mock.chat_hits(), 0);
}

#[tokio::test]
async fn question_is_bound_to_session_and_answered() {
    let mock = Mock::new();
    let backend = spawn_backend(mock.clone()).await;
    let mut state = established(&backend, &mock, "abc123").await;
    mock.reply_chat(Reply::ok(r#"{"answer":"$500"}"#));

    let pending = state
        .begin_question("What is my deduction?")
        .expect("question accepted");

    let turns = state.transcript().turns();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].role, TurnRole::User);
    assert_eq!(turns[0].content, "What is my deduction?");
    assert_eq!(state.transcript().pending().len(), 1);

    let result = pending.send(&backend).await;
    state.finish_question(pending, result).expect("answered");

    let turns = state.transcript().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1].role, TurnRole::Assistant);
    assert_eq!(turns[1].content, "$500");
    assert!(state.transcript().pending().is_empty());

    let chats = mock.chats.lock().unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].session.as_deref(), Some("abc123"));
    assert_eq!(
        chats[0].body,
        serde_json::json!({ "question": "What is my deduction?" })
    );
}

#[tokio::test]
async fn chat_rejection_becomes_error_turn() {
    let mock = Mock::new();
    let backend = spawn_backend(mock.clone()).await;
    let mut state = established(&backend, &mock, "abc123").await;
    mock.reply_chat(Reply::status(StatusCode::NOT_FOUND, "unknown session"));

    let err = state.submit_question(&backend, "hello?").await.unwrap_err();

    assert!(matches!(err, ChatError::Rejected { status: 404, .. }));
    assert_eq!(state.transcript().count(TurnRole::User), 1);
    assert_eq!(state.transcript().count(TurnRole::Assistant), 1);
    assert_eq!(
        state.transcript().last().map(|t| t.content.as_str()),
        Some("Error: unknown session")
    );
}

#[tokio::test]
async fn chat_transport_failure_becomes_generic_turn() {
    let mock = Mock::new();
    let backend = spawn_backend(mock.clone()).await;
    let mut state = established(&backend, &mock, "abc123").await;

    let dead = dead_backend().await;
    let err = state.submit_question(&dead, "hello?").await.unwrap_err();

    assert!(matches!(err, ChatError::Transport(_)));
    assert_eq!(state.transcript().len(), 2);
    assert_eq!(
        state.transcript().last().map(|t| t.content.as_str()),
        Some("Error contacting the server.")
    );
}

#[tokio::test]
async fn chat_input_buffer_is_cleared_on_submit() {
    let mock = Mock::new();
    let backend = spawn_backend(mock.clone()).await;
    let mut state = established(&backend, &mock, "abc123").await;
    mock.reply_chat(Reply::ok(r#"{"answer":"Austin"}"#));

    state.set_chat_input("Which city?");
    state
        .submit_chat_input(&backend)
        .await
        .expect("answered");

    assert_eq!(state.chat_input(), "");
    assert_eq!(state.transcript().turns()[0].content, "Which city?");
    assert_eq!(state.transcript().turns()[1].content, "Austin");
}

#[tokio::test]
async fn field_edits_continue_alongside_chat() {
    let mock = Mock::new();
    let backend = spawn_backend(mock.clone()).await;
    let mut state = established(&backend, &mock, "abc123").await;
    mock.reply_chat(Reply::ok(r#"{"answer":"noted"}"#));

    let pending = state.begin_question("Add my kid?").expect("accepted");
    let index = state.add_dependent();
    state
        .set_dependent_field(index, docintake_protocol::DependentField::FirstName, "Sam")
        .unwrap();
    let result = pending.send(&backend).await;
    state.finish_question(pending, result).unwrap();

    assert_eq!(state.document().dependents[0].first_name, "Sam");
    assert_eq!(state.document().first_name, "Jane");
    assert_eq!(state.transcript().len(), 2);
}
