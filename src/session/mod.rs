//! Conversation session state machine.
//!
//! A session owns one [`Transcript`] and moves through three states:
//!
//! ```text
//! Uninitialized --seed()--> Seeded --submit()--> Active
//! ```
//!
//! The transitions are monotone; there is no way back to `Uninitialized`
//! short of dropping the session. Seeding is atomic: the transcript is
//! committed only after the seed round-trip succeeds, so the "already
//! seeded" marker (transcript presence) can never disagree with the
//! transcript contents. Completion calls are strictly sequential per
//! session; `&mut self` on [`ChatSession::seed`] and [`ChatSession::submit`]
//! makes interleaving unrepresentable.

mod transcript;

pub use transcript::Transcript;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};
use ulid::Ulid;

use crate::llm::{
    Choice, CompletionError, CompletionRequest, CompletionService, GenerationParams, Message, Role,
    Usage,
};

/// Lifecycle state of a [`ChatSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transcript exists yet.
    Uninitialized,
    /// The persona seed and opening assistant turn are in place.
    Seeded,
    /// At least one user turn has been exchanged.
    Active,
}

/// Outcome of submitting user input.
#[derive(Debug, PartialEq)]
pub enum Turn {
    /// Input was empty or whitespace-only; nothing was appended or sent.
    Ignored,
    /// The assistant produced a reply, already appended to the transcript.
    Reply(Message),
}

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session has not been seeded")]
    NotSeeded,

    #[error("session is already seeded")]
    AlreadySeeded,

    #[error("no dangling user turn to retry")]
    NothingToRetry,

    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),
}

/// One interactive conversation with the assistant.
///
/// Owned exclusively by the interactive surface; dropped when the session
/// ends. Nothing is persisted across sessions.
pub struct ChatSession {
    id: Ulid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    model: String,
    params: GenerationParams,
    persona: String,
    transcript: Option<Transcript>,
}

impl ChatSession {
    pub fn new(
        model: impl Into<String>,
        params: GenerationParams,
        persona: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Ulid::new(),
            created_at: now,
            updated_at: now,
            model: model.into(),
            params,
            persona: persona.into(),
            transcript: None,
        }
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn state(&self) -> SessionState {
        match &self.transcript {
            None => SessionState::Uninitialized,
            Some(t) if t.messages().iter().any(|m| m.role == Role::User) => SessionState::Active,
            Some(_) => SessionState::Seeded,
        }
    }

    /// The transcript, once the session has been seeded.
    pub fn transcript(&self) -> Option<&Transcript> {
        self.transcript.as_ref()
    }

    /// Perform the seed round-trip: system persona in, opening assistant
    /// turn out.
    ///
    /// The transcript is committed only when the round-trip succeeds. A
    /// failed seed leaves the session `Uninitialized` and retryable; a
    /// second seed after success fails with [`SessionError::AlreadySeeded`].
    pub async fn seed(
        &mut self,
        client: &dyn CompletionService,
    ) -> Result<Message, SessionError> {
        if self.transcript.is_some() {
            return Err(SessionError::AlreadySeeded);
        }

        let mut transcript = Transcript::seeded(&self.persona);
        debug!(session = %self.id, "requesting seed completion");
        let request = build_request(&self.model, &self.params, &transcript);
        let completion = client.complete(request).await.map_err(|e| {
            debug!(session = %self.id, error = %e, "seed completion failed");
            e
        })?;
        log_usage(&self.id, completion.usage.as_ref());

        let reply = first_choice(completion.choices)?;
        transcript.push_assistant(reply.content.clone());
        self.transcript = Some(transcript);
        self.updated_at = Utc::now();
        info!(session = %self.id, "session seeded");
        Ok(reply)
    }

    /// Accept one user input and exchange the grown transcript for a reply.
    ///
    /// Empty or whitespace-only input is ignored without mutating the
    /// transcript or contacting the service. On failure the user turn stays
    /// appended, no assistant turn is added, and the session remains usable;
    /// [`ChatSession::retry`] re-attempts the exchange without appending
    /// again.
    pub async fn submit(
        &mut self,
        input: &str,
        client: &dyn CompletionService,
    ) -> Result<Turn, SessionError> {
        let transcript = self.transcript.as_mut().ok_or(SessionError::NotSeeded)?;

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Turn::Ignored);
        }

        transcript.push_user(trimmed);

        // The full history travels on every call: the remote service is
        // stateless and has no memory of its own.
        debug!(session = %self.id, turns = transcript.len(), "requesting completion");
        let request = build_request(&self.model, &self.params, transcript);
        let completion = client.complete(request).await?;
        log_usage(&self.id, completion.usage.as_ref());

        let reply = first_choice(completion.choices)?;
        transcript.push_assistant(reply.content.clone());
        self.updated_at = Utc::now();
        Ok(Turn::Reply(reply))
    }

    /// Re-attempt the last failed exchange.
    ///
    /// A fresh call with the same transcript state: no new user turn is
    /// appended. Only valid while the transcript ends in a dangling user
    /// turn left behind by a failed [`ChatSession::submit`].
    pub async fn retry(
        &mut self,
        client: &dyn CompletionService,
    ) -> Result<Turn, SessionError> {
        let transcript = self.transcript.as_mut().ok_or(SessionError::NotSeeded)?;

        if !matches!(transcript.last(), Some(m) if m.role == Role::User) {
            return Err(SessionError::NothingToRetry);
        }

        debug!(session = %self.id, turns = transcript.len(), "retrying completion");
        let request = build_request(&self.model, &self.params, transcript);
        let completion = client.complete(request).await?;
        log_usage(&self.id, completion.usage.as_ref());

        let reply = first_choice(completion.choices)?;
        transcript.push_assistant(reply.content.clone());
        self.updated_at = Utc::now();
        Ok(Turn::Reply(reply))
    }
}

fn build_request(
    model: &str,
    params: &GenerationParams,
    transcript: &Transcript,
) -> CompletionRequest {
    CompletionRequest::new(model, transcript.messages().to_vec(), params)
}

/// Reduce a completion to its top-ranked choice as an assistant turn.
fn first_choice(choices: Vec<Choice>) -> Result<Message, CompletionError> {
    choices
        .into_iter()
        .next()
        .map(|c| Message::assistant(c.message.content))
        .ok_or(CompletionError::MalformedResponse)
}

fn log_usage(session: &Ulid, usage: Option<&Usage>) {
    if let Some(usage) = usage {
        debug!(
            session = %session,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "token usage"
        );
    }
}
