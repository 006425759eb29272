//! Chat flow
//!
//! A question moves through two observable phases. `begin_question` appends
//! the user turn right away and records it as pending; `finish_question`
//! appends the one assistant turn that answers it and clears the pending
//! entry. Replies carry `reply_to`, so overlapping questions stay
//! attributable even though turns append in completion order.

use docintake_protocol::{ChatResponse, TranscriptTurn, TurnRole};
use tracing::{info, warn};

use crate::backend::Backend;
use crate::error::ChatError;
use crate::state::ClientState;

// ---------------------------------------------------------------------------
// ChatTranscript
// ---------------------------------------------------------------------------

/// Append-only chat history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatTranscript {
    turns: Vec<TranscriptTurn>,
    pending: Vec<String>,
}

impl ChatTranscript {
    pub fn turns(&self) -> &[TranscriptTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptTurn> {
        self.turns.last()
    }

    /// Ids of user turns still waiting for their assistant turn
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn is_pending(&self, turn_id: &str) -> bool {
        self.pending.iter().any(|id| id == turn_id)
    }

    fn push_question(&mut self, content: &str) -> String {
        let turn = TranscriptTurn::user(content);
        let id = turn.id.clone();
        self.turns.push(turn);
        self.pending.push(id.clone());
        id
    }

    fn push_reply(&mut self, content: String, reply_to: &str) {
        self.pending.retain(|id| id != reply_to);
        self.turns
            .push(TranscriptTurn::assistant(content, Some(reply_to.to_string())));
    }

    /// Assistant turn produced locally, answering no request
    fn push_notice(&mut self, content: String) {
        self.turns.push(TranscriptTurn::assistant(content, None));
    }

    pub fn count(&self, role: TurnRole) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }
}

// ---------------------------------------------------------------------------
// In-flight question
// ---------------------------------------------------------------------------

/// A submitted question whose user turn is already in the transcript
#[derive(Debug)]
#[must_use = "send the question and pass the result to `finish_question`"]
pub struct PendingQuestion {
    turn_id: String,
    question: String,
    session_id: String,
}

impl PendingQuestion {
    /// Id of the optimistic user turn
    pub fn turn_id(&self) -> &str {
        &self.turn_id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Ask the backend. Returns the answer text or a classified failure.
    pub async fn send(&self, backend: &Backend) -> Result<String, ChatError> {
        let response = backend
            .post_chat(&self.session_id, &self.question)
            .await
            .map_err(|e| {
                warn!(
                    component = "chat",
                    event = "chat.transport_failed",
                    session_id = %self.session_id,
                    turn_id = %self.turn_id,
                    error = %e,
                    "Chat request failed"
                );
                ChatError::Transport(e.to_string())
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        interpret_chat_response(status, &body)
    }
}

pub(crate) fn interpret_chat_response(status: u16, body: &str) -> Result<String, ChatError> {
    if !(200..300).contains(&status) {
        return Err(ChatError::Rejected {
            status,
            body: body.to_string(),
        });
    }

    serde_json::from_str::<ChatResponse>(body)
        .map(|parsed| parsed.answer)
        .map_err(|e| ChatError::MalformedResponse(e.to_string()))
}

// ---------------------------------------------------------------------------
// State transitions
// ---------------------------------------------------------------------------

impl ClientState {
    /// Phase one of a question.
    ///
    /// Without a session, or with a blank question, a single assistant turn
    /// explains why and no request is prepared. Otherwise the user turn is
    /// appended, the chat input is cleared and the pending question is
    /// returned.
    pub fn begin_question(&mut self, text: &str) -> Result<PendingQuestion, ChatError> {
        let Some(session_id) = self.session.as_ref().map(|s| s.id().to_string()) else {
            return Err(self.refuse_question(ChatError::NoSession));
        };
        if text.trim().is_empty() {
            return Err(self.refuse_question(ChatError::EmptyQuestion));
        }

        let turn_id = self.transcript.push_question(text);
        self.chat_input.clear();

        info!(
            component = "chat",
            event = "chat.question_submitted",
            session_id = %session_id,
            turn_id = %turn_id,
            pending = self.transcript.pending().len(),
        );

        Ok(PendingQuestion {
            turn_id,
            question: text.to_string(),
            session_id,
        })
    }

    /// Phase two: append exactly one assistant turn for `pending`.
    pub fn finish_question(
        &mut self,
        pending: PendingQuestion,
        result: Result<String, ChatError>,
    ) -> Result<(), ChatError> {
        match result {
            Ok(answer) => {
                info!(
                    component = "chat",
                    event = "chat.answered",
                    session_id = %pending.session_id,
                    turn_id = %pending.turn_id,
                );
                self.transcript.push_reply(answer, &pending.turn_id);
                Ok(())
            }
            Err(err) => {
                match &err {
                    ChatError::Rejected { status, .. } => warn!(
                        component = "chat",
                        event = "chat.rejected",
                        session_id = %pending.session_id,
                        status = *status,
                    ),
                    ChatError::MalformedResponse(reason) => warn!(
                        component = "chat",
                        event = "chat.malformed_response",
                        session_id = %pending.session_id,
                        reason = %reason,
                    ),
                    _ => {}
                }
                self.transcript.push_reply(err.to_string(), &pending.turn_id);
                Err(err)
            }
        }
    }

    /// Ask a question end to end.
    pub async fn submit_question(&mut self, backend: &Backend, text: &str) -> Result<(), ChatError> {
        let pending = self.begin_question(text)?;
        let result = pending.send(backend).await;
        self.finish_question(pending, result)
    }

    /// Submit whatever is in the chat input buffer.
    pub async fn submit_chat_input(&mut self, backend: &Backend) -> Result<(), ChatError> {
        let text = self.chat_input.clone();
        self.submit_question(backend, &text).await
    }

    fn refuse_question(&mut self, err: ChatError) -> ChatError {
        self.transcript.push_notice(err.to_string());
        err
    }
}
