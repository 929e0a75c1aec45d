//! Client-side state of one practice session.
//!
//! Lifecycle: `NotStarted -> Started -> Finished`. There is no way back from
//! `Finished`; build a new store for a new session.
//!
//! Correctness shown to the user is judged locally against the question's
//! answer key, so the reveal works even when the backend submit fails. A
//! question listed without its key borrows the key from the submit ack.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::{matches_key, AnsweredQuestion, Question, SessionResults, SubmitAck};
use crate::error::{GatewayError, SessionError};
use crate::gateway::SessionApi;
use crate::time::{elapsed_whole_seconds, Clock};

pub const DEFAULT_SESSION_TYPE: &str = "practice";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
  NotStarted,
  Started,
  Finished,
}

/// Current pick for a question, plus when the user first picked anything for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
  pub answer: String,
  pub first_selected_at: DateTime<Utc>,
}

/// Result of checking one answer.
///
/// `answered` is always present; `ack` carries what the backend said, if the
/// submit got through.
#[derive(Debug)]
pub struct CheckOutcome {
  pub answered: AnsweredQuestion,
  pub correct_answer: String,
  pub explanation: String,
  pub ack: Result<SubmitAck, SessionError>,
}

pub struct SessionStore<A: SessionApi> {
  api: A,
  clock: Clock,
  session_type: String,
  session_id: Option<i64>,
  finished: bool,
  selections: HashMap<i64, Selection>,
  answers: Vec<AnsweredQuestion>,
  acks: Vec<SubmitAck>,
  results: Option<SessionResults>,
}

impl<A: SessionApi> SessionStore<A> {
  pub fn new(api: A) -> Self {
    Self::with_clock(api, Clock::default())
  }

  pub fn with_clock(api: A, clock: Clock) -> Self {
    Self {
      api,
      clock,
      session_type: DEFAULT_SESSION_TYPE.to_string(),
      session_id: None,
      finished: false,
      selections: HashMap::new(),
      answers: Vec::new(),
      acks: Vec::new(),
      results: None,
    }
  }

  pub fn state(&self) -> SessionState {
    match (self.session_id, self.finished) {
      (_, true) => SessionState::Finished,
      (Some(_), false) => SessionState::Started,
      (None, false) => SessionState::NotStarted,
    }
  }

  pub fn session_id(&self) -> Option<i64> {
    self.session_id
  }

  pub fn selection(&self, question_id: i64) -> Option<&Selection> {
    self.selections.get(&question_id)
  }

  /// Answers checked so far, in order.
  pub fn answers(&self) -> &[AnsweredQuestion] {
    &self.answers
  }

  /// Backend acknowledgements for submits that succeeded.
  pub fn acks(&self) -> &[SubmitAck] {
    &self.acks
  }

  pub fn results(&self) -> Option<&SessionResults> {
    self.results.as_ref()
  }

  #[cfg(test)]
  pub(crate) fn clock_mut(&mut self) -> &mut Clock {
    &mut self.clock
  }

  /// Ask the backend for a session id. No request when one is already held.
  #[instrument(level = "info", skip(self))]
  pub async fn start(&mut self) -> Result<i64, SessionError> {
    if self.finished {
      return Err(SessionError::Finished);
    }
    if let Some(id) = self.session_id {
      debug!(target: "session", session_id = id, "Session already started");
      return Ok(id);
    }
    match self.api.start_session(&self.session_type).await {
      Ok(id) => {
        info!(target: "session", session_id = id, "Session started");
        self.session_id = Some(id);
        Ok(id)
      }
      Err(e) => {
        error!(target: "session", error = %e, "Failed to start session");
        Err(SessionError::StartFailed(e))
      }
    }
  }

  /// Record a pick. Only the first pick for a question stamps its start time.
  pub fn select_answer(&mut self, question_id: i64, answer: &str) {
    let now = self.clock.now();
    let entry = self.selections.entry(question_id).or_insert_with(|| Selection {
      answer: String::new(),
      first_selected_at: now,
    });
    entry.answer = answer.to_string();
    debug!(target: "session", question_id, "Answer selected");
  }

  /// Seconds since the first pick for `question_id`; 0 if never picked.
  pub fn elapsed_seconds(&self, question_id: i64) -> u64 {
    self.selections
      .get(&question_id)
      .map(|s| elapsed_whole_seconds(s.first_selected_at, self.clock.now()))
      .unwrap_or(0)
  }

  /// Judge the current pick for `question`, then submit it.
  ///
  /// Fails only when nothing is selected or the session is finished. Backend
  /// trouble (including a lazy start that fails) lands in `CheckOutcome::ack`.
  #[instrument(level = "info", skip(self, question), fields(question_id = question.id))]
  pub async fn check_answer(&mut self, question: &Question) -> Result<CheckOutcome, SessionError> {
    let selected = self
      .selections
      .get(&question.id)
      .map(|s| s.answer.clone())
      .ok_or(SessionError::NoSelection(question.id))?;
    let elapsed = self.elapsed_seconds(question.id);
    self.submit_answer(question, &selected, elapsed).await
  }

  /// Local judgement plus backend submit for an explicit answer and time.
  #[instrument(level = "info", skip(self, question, answer), fields(question_id = question.id))]
  pub async fn submit_answer(
    &mut self,
    question: &Question,
    answer: &str,
    elapsed_seconds: u64,
  ) -> Result<CheckOutcome, SessionError> {
    if self.finished {
      return Err(SessionError::Finished);
    }

    let ack = self.send_to_backend(question.id, answer, elapsed_seconds).await;

    // List responses may omit the answer key; the submit ack then carries it.
    let (correct_answer, explanation) = match &ack {
      Ok(a) if question.correct_answer.is_empty() => (a.correct_answer.clone(), a.explanation.clone()),
      _ => (question.correct_answer.clone(), question.explanation.clone()),
    };
    let answered = AnsweredQuestion {
      question_id: question.id,
      selected_answer: answer.to_string(),
      is_correct: matches_key(answer, &correct_answer),
      elapsed_seconds,
    };
    self.answers.push(answered.clone());

    match &ack {
      Ok(a) => {
        if a.is_correct != answered.is_correct {
          // Backend judges case-insensitively; the reveal sticks to exact match.
          debug!(target: "session", question_id = question.id, local = answered.is_correct, backend = a.is_correct, "Backend verdict differs from local");
        }
        self.acks.push(a.clone());
      }
      Err(e) => warn!(target: "session", question_id = question.id, error = %e, "Submit failed; showing local result only"),
    }

    Ok(CheckOutcome { answered, correct_answer, explanation, ack })
  }

  async fn send_to_backend(&mut self, question_id: i64, answer: &str, elapsed: u64) -> Result<SubmitAck, SessionError> {
    let session_id = match self.session_id {
      Some(id) => id,
      None => self.start().await?,
    };
    self.api
      .submit_answer(session_id, question_id, answer, elapsed)
      .await
      .map_err(SessionError::from)
  }

  /// Finalize on the backend. The store is read-only afterwards.
  ///
  /// A second call returns `SessionError::Finished` without contacting the backend.
  #[instrument(level = "info", skip(self))]
  pub async fn finish(&mut self) -> Result<SessionResults, SessionError> {
    if self.finished {
      warn!(target: "session", session_id = ?self.session_id, "Finish called on a finished session");
      return Err(SessionError::Finished);
    }
    let session_id = self.session_id.ok_or(SessionError::NotStarted)?;
    let results = self.api.finish_session(session_id).await.map_err(|e: GatewayError| {
      error!(target: "session", session_id, error = %e, "Failed to finish session");
      SessionError::Gateway(e)
    })?;
    self.finished = true;
    self.results = Some(results.clone());
    info!(target: "session", session_id, answers = self.answers.len(), "Session finalized");
    Ok(results)
  }
}
